#![deny(unsafe_code)]

//! Name matching for opaque transformation units.
//!
//! Given the inputs and outputs a fitted unit declares, [`NameMatcher`]
//! decides which input each output came from.

pub mod matcher;
pub mod prefix;

pub use matcher::{MatchOutcome, MatchTier, NameMatcher};
pub use prefix::{PrefixMode, PrefixPattern};

//! Data model for column lineage tracking.
//!
//! - **ids**: [`ColumnName`] and name-list validation
//! - **node**: fitted tree shapes ([`Leaf`], [`Sequential`], [`Router`]) and
//!   the [`LeafAdapter`] contract
//! - **lineage**: [`LineageMap`] and its inversion
//! - **error**: [`LineageError`]

pub mod error;
pub mod ids;
pub mod lineage;
pub mod node;

pub use error::{LineageError, Result};
pub use ids::{ColumnName, column_names, ensure_unique};
pub use lineage::{LineageMap, ReverseLineage};
pub use node::{Leaf, LeafAdapter, Node, Route, Router, Sequential, Stage, SubMap};

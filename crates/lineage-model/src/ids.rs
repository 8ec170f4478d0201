#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::fmt;

use crate::{LineageError, Result};

/// An immutable column identifier.
///
/// Names are kept byte-for-byte as supplied; only the empty string is
/// rejected.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(LineageError::InvalidColumnName(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `token__name`, the name a router gives a child output.
    pub fn namespaced(&self, token: &str) -> Self {
        Self(format!("{token}__{}", self.0))
    }

    /// Returns `name + suffix`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{suffix}", self.0))
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ColumnName {
    type Error = LineageError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ColumnName {
    type Error = LineageError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ColumnName> for String {
    fn from(value: ColumnName) -> Self {
        value.0
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ColumnName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Parses a list of raw names into [`ColumnName`]s, rejecting duplicates.
pub fn column_names<I, S>(names: I, context: &str) -> Result<Vec<ColumnName>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let parsed = names
        .into_iter()
        .map(ColumnName::new)
        .collect::<Result<Vec<_>>>()?;
    ensure_unique(&parsed, context)?;
    Ok(parsed)
}

/// Fails with [`LineageError::DuplicateColumnName`] when a name repeats.
///
/// Every repeated name is reported once, in order of its second appearance.
pub fn ensure_unique(names: &[ColumnName], context: &str) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && !repeated.contains(&name.as_str()) {
            repeated.push(name.as_str());
        }
    }
    if repeated.is_empty() {
        return Ok(());
    }
    Err(LineageError::DuplicateColumnName {
        context: context.to_string(),
        names: repeated.into_iter().map(str::to_string).collect(),
    })
}

/// Fails with [`LineageError::MalformedTree`] when a name list is empty.
pub fn ensure_non_empty(names: &[ColumnName], node: &str, what: &str) -> Result<()> {
    if names.is_empty() {
        return Err(LineageError::MalformedTree {
            node: node.to_string(),
            reason: format!("{what} must name at least one column"),
        });
    }
    Ok(())
}

use thiserror::Error;

/// Failures raised while validating a tree or tracing its columns.
///
/// All variants are fatal: a lineage map that covers only some columns is
/// never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineageError {
    #[error("invalid column name {0:?}: names must be non-empty")]
    InvalidColumnName(String),

    #[error("duplicate column names in {context}: {}", .names.join(", "))]
    DuplicateColumnName { context: String, names: Vec<String> },

    #[error("couldn't account for outputs at {node}: {}", .missing.join(", "))]
    UnaccountedOutput { node: String, missing: Vec<String> },

    #[error("output {output} is claimed by more than one input: {}", .inputs.join(", "))]
    AmbiguousProvenance { output: String, inputs: Vec<String> },

    #[error("malformed tree at {node}: {reason}")]
    MalformedTree { node: String, reason: String },
}

impl LineageError {
    pub(crate) fn malformed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidColumnName(_) => "invalid_column_name",
            Self::DuplicateColumnName { .. } => "duplicate_column_name",
            Self::UnaccountedOutput { .. } => "unaccounted_output",
            Self::AmbiguousProvenance { .. } => "ambiguous_provenance",
            Self::MalformedTree { .. } => "malformed_tree",
        }
    }
}

pub type Result<T> = std::result::Result<T, LineageError>;

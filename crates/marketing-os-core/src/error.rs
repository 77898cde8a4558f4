use crate::record::RecordId;

/// Inline, user-recoverable rejection of a mutating action.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("a record named \"{name}\" already exists")]
    DuplicateName { name: String },
    #[error("{field} must be a valid http(s) URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: f64, max: f64 },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("record not found: id={0}")]
    NotFound(RecordId),
    #[error("duplicate record id: {0}")]
    DuplicateId(RecordId),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown module `{module}` for role `{role}`")]
    UnknownModule { role: String, module: String },
    #[error("page size MUST be >= 1")]
    InvalidPage,
}

impl CoreError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

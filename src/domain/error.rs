use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid configuration path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("collection entry `{key}` must be a {expected}, got {actual}")]
    NotALink {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn invalid_path(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_a_link(key: impl ToString, actual: &'static str) -> Self {
        Self::NotALink {
            key: key.to_string(),
            expected: "link record",
            actual,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

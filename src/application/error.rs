use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{link_lists::LinkListConfigError, repos::RepoError},
    config::LoadError,
    infra::error::InfraError,
};

/// Flattened error chain for reporting.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn summary(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    LinkList(#[from] LinkListConfigError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }

    /// Process exit code for the command-line binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_)
            | AppError::LinkList(LinkListConfigError::DefaultLocale(_))
            | AppError::LinkList(LinkListConfigError::Domain(_)) => 2,
            AppError::LinkList(LinkListConfigError::Repo(RepoError::NotFound(_))) => 3,
            _ => 1,
        }
    }
}

/// Rejected setting values are bad input; a settings source that cannot be
/// read or merged is not.
impl From<LoadError> for AppError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::Invalid { .. } => Self::validation(error.to_string()),
            LoadError::Build(_) => Self::unexpected(format!("failed to load configuration: {error}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::LinkListId;

    #[test]
    fn report_walks_the_source_chain() {
        let io = std::io::Error::other("disk full");
        let error = AppError::from(InfraError::from(io));

        let report = error.report();
        assert_eq!(report.source, "application::error::AppError");
        assert_eq!(report.messages.first().map(String::as_str), Some("io error: disk full"));
    }

    #[test]
    fn exit_codes_distinguish_input_from_missing_lists() {
        let missing = LinkListId::new("news").expect("valid id");
        assert_eq!(
            AppError::from(LinkListConfigError::Repo(RepoError::NotFound(missing))).exit_code(),
            3
        );
        assert_eq!(AppError::validation("bad").exit_code(), 2);
        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
    }

    #[test]
    fn invalid_settings_exit_as_bad_input() {
        let invalid = AppError::from(LoadError::Invalid {
            key: "locale.default",
            reason: "must not be empty".to_string(),
        });
        assert!(matches!(invalid, AppError::Validation(_)));
        assert_eq!(invalid.exit_code(), 2);
        assert!(invalid.to_string().contains("locale.default"), "{invalid}");

        let unreadable = AppError::from(LoadError::Build(::config::ConfigError::Message(
            "unreadable source".to_string(),
        )));
        assert!(matches!(unreadable, AppError::Unexpected(_)));
        assert_eq!(unreadable.exit_code(), 1);
    }
}

//! Persistence contract the host wires to its own storage.
//!
//! Canonical trees and locale overlays are stored separately; an overlay only
//! ever holds the sparse output of
//! [`ConfigurationOverlayEngine::store_translation`](super::overlay::ConfigurationOverlayEngine::store_translation).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ids::{LinkListId, Locale};
use crate::domain::tree::ConfigTree;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("link list `{0}` not found")]
    NotFound(LinkListId),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait LinkListConfigRepo: Send + Sync {
    /// Fails with [`RepoError::NotFound`] when no canonical tree was ever saved.
    async fn load_canonical(&self, id: &LinkListId) -> Result<ConfigTree, RepoError>;

    async fn save_canonical(&self, id: &LinkListId, tree: &ConfigTree) -> Result<(), RepoError>;

    async fn load_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
    ) -> Result<Option<ConfigTree>, RepoError>;

    /// Fails with [`RepoError::NotFound`] when the list has no canonical tree.
    async fn save_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
        tree: &ConfigTree,
    ) -> Result<(), RepoError>;
}

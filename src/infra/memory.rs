//! Process-local configuration store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::application::repos::{LinkListConfigRepo, RepoError};
use crate::domain::ids::{LinkListId, Locale};
use crate::domain::tree::ConfigTree;

#[derive(Debug, Default)]
struct StoredLinkList {
    canonical: ConfigTree,
    overlays: HashMap<Locale, ConfigTree>,
}

/// Keeps canonical trees and overlays in memory, one entry per link list.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    lists: RwLock<HashMap<LinkListId, StoredLinkList>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored link lists.
    pub fn len(&self) -> usize {
        self.lists.read().map(|lists| lists.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> RepoError {
    RepoError::from_persistence("config store lock poisoned")
}

#[async_trait]
impl LinkListConfigRepo for InMemoryConfigStore {
    async fn load_canonical(&self, id: &LinkListId) -> Result<ConfigTree, RepoError> {
        let lists = self.lists.read().map_err(|_| poisoned())?;
        lists
            .get(id)
            .map(|stored| stored.canonical.clone())
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }

    async fn save_canonical(&self, id: &LinkListId, tree: &ConfigTree) -> Result<(), RepoError> {
        let mut lists = self.lists.write().map_err(|_| poisoned())?;
        lists.entry(id.clone()).or_default().canonical = tree.clone();
        Ok(())
    }

    async fn load_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
    ) -> Result<Option<ConfigTree>, RepoError> {
        let lists = self.lists.read().map_err(|_| poisoned())?;
        Ok(lists
            .get(id)
            .and_then(|stored| stored.overlays.get(locale))
            .cloned())
    }

    async fn save_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
        tree: &ConfigTree,
    ) -> Result<(), RepoError> {
        let mut lists = self.lists.write().map_err(|_| poisoned())?;
        let stored = lists
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(id.clone()))?;
        stored.overlays.insert(locale.clone(), tree.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id() -> LinkListId {
        LinkListId::new("news").expect("valid id")
    }

    #[tokio::test]
    async fn canonical_and_overlays_are_kept_apart() {
        let store = InMemoryConfigStore::new();
        let fr = Locale::new("fr").expect("locale");
        let canonical = ConfigTree::from_value(json!({"size": 3})).expect("object");
        let overlay = ConfigTree::from_value(json!({"more": {"title_override": "Plus"}}))
            .expect("object");

        store.save_canonical(&id(), &canonical).await.expect("saved");
        store.save_overlay(&id(), &fr, &overlay).await.expect("saved");

        assert_eq!(store.load_canonical(&id()).await.expect("loaded"), canonical);
        assert_eq!(
            store.load_overlay(&id(), &fr).await.expect("loaded"),
            Some(overlay)
        );
        assert_eq!(
            store
                .load_overlay(&id(), &Locale::new("de").expect("locale"))
                .await
                .expect("loaded"),
            None
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn overlays_require_a_canonical_tree() {
        let store = InMemoryConfigStore::new();
        let err = store
            .save_overlay(&id(), &Locale::new("fr").expect("locale"), &ConfigTree::new())
            .await
            .expect_err("no canonical");
        assert!(matches!(err, RepoError::NotFound(_)));
        assert!(store.is_empty());
    }
}

//! TOML-on-disk configuration store.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<list>/canonical.toml
//! <root>/<list>/overlays/<locale>.toml
//! ```
//!
//! TOML has no `null`, so trees containing nulls cannot be saved here.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::repos::{LinkListConfigRepo, RepoError};
use crate::domain::ids::{LinkListId, Locale};
use crate::domain::tree::ConfigTree;

use super::error::InfraError;

const SOURCE: &str = "linklists::infra::files";
const CANONICAL_FILE: &str = "canonical.toml";
const OVERLAY_DIR: &str = "overlays";

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn list_dir(&self, id: &LinkListId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn canonical_path(&self, id: &LinkListId) -> PathBuf {
        self.list_dir(id).join(CANONICAL_FILE)
    }

    fn overlay_path(&self, id: &LinkListId, locale: &Locale) -> PathBuf {
        self.list_dir(id)
            .join(OVERLAY_DIR)
            .join(format!("{}.toml", locale.as_str()))
    }
}

/// Reads a configuration tree from a TOML file.
pub async fn read_tree_file(path: &Path) -> Result<ConfigTree, InfraError> {
    let contents = fs::read_to_string(path).await?;
    parse_tree(&contents)
        .map_err(|err| InfraError::serialization(format!("{}: {err}", path.display())))
}

fn parse_tree(contents: &str) -> Result<ConfigTree, toml::de::Error> {
    toml::from_str(contents)
}

fn render_tree(tree: &ConfigTree) -> Result<String, RepoError> {
    toml::to_string(tree).map_err(|err| {
        RepoError::invalid_input(format!("configuration cannot be stored as TOML: {err}"))
    })
}

async fn read_optional(path: &Path) -> Result<Option<ConfigTree>, RepoError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RepoError::from_persistence(err)),
    };
    parse_tree(&contents)
        .map(Some)
        .map_err(|err| RepoError::from_persistence(format!("{}: {err}", path.display())))
}

async fn write_atomically(path: &Path, contents: String) -> Result<(), RepoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(RepoError::from_persistence)?;
    }
    let staging = path.with_extension("toml.tmp");
    fs::write(&staging, contents)
        .await
        .map_err(RepoError::from_persistence)?;
    fs::rename(&staging, path)
        .await
        .map_err(RepoError::from_persistence)
}

#[async_trait]
impl LinkListConfigRepo for FileConfigStore {
    async fn load_canonical(&self, id: &LinkListId) -> Result<ConfigTree, RepoError> {
        read_optional(&self.canonical_path(id))
            .await?
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }

    async fn save_canonical(&self, id: &LinkListId, tree: &ConfigTree) -> Result<(), RepoError> {
        let path = self.canonical_path(id);
        write_atomically(&path, render_tree(tree)?).await?;
        debug!(target = SOURCE, path = %path.display(), "wrote canonical configuration");
        Ok(())
    }

    async fn load_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
    ) -> Result<Option<ConfigTree>, RepoError> {
        read_optional(&self.overlay_path(id, locale)).await
    }

    async fn save_overlay(
        &self,
        id: &LinkListId,
        locale: &Locale,
        tree: &ConfigTree,
    ) -> Result<(), RepoError> {
        if fs::metadata(self.canonical_path(id)).await.is_err() {
            return Err(RepoError::NotFound(id.clone()));
        }
        let path = self.overlay_path(id, locale);
        write_atomically(&path, render_tree(tree)?).await?;
        debug!(target = SOURCE, path = %path.display(), "wrote translation overlay");
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
    async fn layout_separates_canonical_and_overlays() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());
        let fr = Locale::new("fr").expect("locale");

        let canonical = ConfigTree::from_value(json!({
            "source": {"plugin": "rss", "plugin_configuration": {"url": "http://a"}},
        }))
        .expect("object");
        let overlay = ConfigTree::from_value(json!({
            "source": {"plugin_configuration": {"url": "http://b"}},
        }))
        .expect("object");

        store.save_canonical(&id(), &canonical).await.expect("saved");
        store.save_overlay(&id(), &fr, &overlay).await.expect("saved");

        assert!(dir.path().join("news/canonical.toml").is_file());
        assert!(dir.path().join("news/overlays/fr.toml").is_file());
        assert_eq!(store.load_canonical(&id()).await.expect("loaded"), canonical);
        assert_eq!(store.load_overlay(&id(), &fr).await.expect("loaded"), Some(overlay));
    }

    #[tokio::test]
    async fn missing_files_map_to_not_found_and_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());
        let fr = Locale::new("fr").expect("locale");

        assert!(matches!(
            store.load_canonical(&id()).await,
            Err(RepoError::NotFound(_))
        ));
        assert_eq!(store.load_overlay(&id(), &fr).await.expect("ok"), None);
        assert!(matches!(
            store.save_overlay(&id(), &fr, &ConfigTree::new()).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn null_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileConfigStore::new(dir.path());
        let tree = ConfigTree::from_value(json!({"more": {"title_override": null}})).expect("object");

        assert!(matches!(
            store.save_canonical(&id(), &tree).await,
            Err(RepoError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn read_tree_file_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "source = [").expect("write");

        let err = read_tree_file(&path).await.expect_err("invalid toml");
        assert!(err.to_string().contains("broken.toml"), "{err}");
    }
}

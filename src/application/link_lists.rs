use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::overlay::ConfigurationOverlayEngine;
use crate::application::repos::{LinkListConfigRepo, RepoError};
use crate::domain::error::DomainError;
use crate::domain::ids::{LinkListId, Locale};
use crate::domain::path::{ConfigPath, PathSet};
use crate::domain::tree::ConfigTree;

const SOURCE: &str = "linklists::application::link_lists";

#[derive(Debug, Error)]
pub enum LinkListConfigError {
    #[error("`{0}` is the default locale; edit the canonical configuration instead")]
    DefaultLocale(Locale),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Host-facing entry point: loads trees through the repo and runs them
/// through the overlay engine.
#[derive(Clone)]
pub struct LinkListConfigService {
    repo: Arc<dyn LinkListConfigRepo>,
    engine: ConfigurationOverlayEngine,
    default_locale: Locale,
}

impl LinkListConfigService {
    pub fn new(
        repo: Arc<dyn LinkListConfigRepo>,
        engine: ConfigurationOverlayEngine,
        default_locale: Locale,
    ) -> Self {
        Self {
            repo,
            engine,
            default_locale,
        }
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub fn engine(&self) -> &ConfigurationOverlayEngine {
        &self.engine
    }

    /// Configuration to hand to strategy plugins when rendering `locale`.
    pub async fn effective_configuration(
        &self,
        id: &LinkListId,
        locale: &Locale,
    ) -> Result<ConfigTree, LinkListConfigError> {
        let canonical = self.repo.load_canonical(id).await?;
        if *locale == self.default_locale {
            return Ok(canonical);
        }

        let overlay = self.repo.load_overlay(id, locale).await?;
        if overlay.is_none() {
            debug!(
                target = SOURCE,
                list = %id,
                locale = %locale,
                "no overlay stored; using canonical configuration"
            );
        }

        Ok(self.engine.resolve(&canonical, overlay.as_ref())?)
    }

    pub async fn save_canonical(
        &self,
        id: &LinkListId,
        tree: &ConfigTree,
    ) -> Result<(), LinkListConfigError> {
        self.repo.save_canonical(id, tree).await?;
        info!(target = SOURCE, list = %id, "saved canonical configuration");
        Ok(())
    }

    /// Extracts and persists the translatable part of an editor's submission.
    /// Returns the stored overlay.
    pub async fn save_translation(
        &self,
        id: &LinkListId,
        locale: &Locale,
        submitted: &ConfigTree,
    ) -> Result<ConfigTree, LinkListConfigError> {
        if *locale == self.default_locale {
            return Err(LinkListConfigError::DefaultLocale(locale.clone()));
        }

        let canonical = self.repo.load_canonical(id).await?;
        let overlay = self.engine.store_translation(&canonical, submitted)?;
        self.repo.save_overlay(id, locale, &overlay).await?;

        info!(
            target = SOURCE,
            list = %id,
            locale = %locale,
            "saved translation overlay"
        );
        Ok(overlay)
    }

    pub async fn translatable_paths(&self, id: &LinkListId) -> Result<PathSet, LinkListConfigError> {
        let canonical = self.repo.load_canonical(id).await?;
        Ok(self.engine.compute_path_set(&canonical)?)
    }

    /// Stored overlay values the current canonical selection ignores.
    pub async fn orphaned_paths(
        &self,
        id: &LinkListId,
        locale: &Locale,
    ) -> Result<Vec<ConfigPath>, LinkListConfigError> {
        let canonical = self.repo.load_canonical(id).await?;
        match self.repo.load_overlay(id, locale).await? {
            Some(overlay) => Ok(self.engine.orphaned_paths(&canonical, &overlay)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::plugin::{PluginRegistry, PluginRole, StrategyPlugin, TranslatableCapability};
    use crate::infra::memory::InMemoryConfigStore;

    struct Rss;

    impl StrategyPlugin for Rss {
        fn id(&self) -> &str {
            "rss"
        }

        fn translatable(&self) -> Option<&dyn TranslatableCapability> {
            Some(self)
        }
    }

    impl TranslatableCapability for Rss {
        fn translatable_paths(&self) -> Vec<ConfigPath> {
            vec![ConfigPath::new(["url"])]
        }
    }

    fn service() -> LinkListConfigService {
        let registry = PluginRegistry::new().with(PluginRole::Source, Arc::new(Rss));
        LinkListConfigService::new(
            Arc::new(InMemoryConfigStore::new()),
            ConfigurationOverlayEngine::new(Arc::new(registry)),
            Locale::new("en").expect("valid locale"),
        )
    }

    fn id() -> LinkListId {
        LinkListId::new("news").expect("valid id")
    }

    fn canonical() -> ConfigTree {
        ConfigTree::from_value(json!({
            "source": {"plugin": "rss", "plugin_configuration": {"url": "http://a"}},
        }))
        .expect("object root")
    }

    #[tokio::test]
    async fn default_locale_reads_canonical() {
        let service = service();
        service.save_canonical(&id(), &canonical()).await.expect("saved");

        let effective = service
            .effective_configuration(&id(), &Locale::new("en").expect("locale"))
            .await
            .expect("resolves");
        assert_eq!(effective, canonical());
    }

    #[tokio::test]
    async fn translation_round_trip() {
        let service = service();
        let fr = Locale::new("fr").expect("locale");
        service.save_canonical(&id(), &canonical()).await.expect("saved");

        let submitted = ConfigTree::from_value(json!({
            "source": {"plugin": "other", "plugin_configuration": {"url": "http://fr"}},
        }))
        .expect("object root");
        service
            .save_translation(&id(), &fr, &submitted)
            .await
            .expect("stored");

        let effective = service
            .effective_configuration(&id(), &fr)
            .await
            .expect("resolves");
        assert_eq!(
            effective.into_value(),
            json!({"source": {"plugin": "rss", "plugin_configuration": {"url": "http://fr"}}})
        );
        assert!(
            service
                .orphaned_paths(&id(), &fr)
                .await
                .expect("valid")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn untranslated_locale_falls_back_to_canonical() {
        let service = service();
        service.save_canonical(&id(), &canonical()).await.expect("saved");

        let effective = service
            .effective_configuration(&id(), &Locale::new("de").expect("locale"))
            .await
            .expect("resolves");
        assert_eq!(effective, canonical());
    }

    #[tokio::test]
    async fn default_locale_cannot_be_translated() {
        let service = service();
        service.save_canonical(&id(), &canonical()).await.expect("saved");

        let err = service
            .save_translation(&id(), &Locale::new("en").expect("locale"), &canonical())
            .await
            .expect_err("default locale rejected");
        assert!(matches!(err, LinkListConfigError::DefaultLocale(_)));
    }

    #[tokio::test]
    async fn unknown_list_is_not_found() {
        let err = service()
            .translatable_paths(&id())
            .await
            .expect_err("missing list");
        assert!(matches!(err, LinkListConfigError::Repo(RepoError::NotFound(_))));
    }
}

//! Merges a canonical link list configuration with sparse per-locale overlays.
//!
//! The set of paths a locale may override is never stored. It is derived on
//! every call from the plugin ids selected in the canonical tree: two fixed
//! "more link" paths plus whatever each selected plugin declares through
//! [`TranslatableCapability`](crate::domain::plugin::TranslatableCapability),
//! prefixed with that plugin's `plugin_configuration` location. Because the
//! plugin selection itself is not translatable, an overlay can never change it.
//!
//! Overlay values that fall outside the current path set (typically left over
//! after the canonical plugin was switched) are ignored by [`resolve`] and
//! only reported at debug level.
//!
//! [`resolve`]: ConfigurationOverlayEngine::resolve

use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::path::{ConfigPath, PathSet};
use crate::domain::plugin::{PluginRegistry, PluginRole};
use crate::domain::tree::ConfigTree;

const SOURCE: &str = "linklists::application::overlay";

pub(crate) const METRIC_RESOLVE_TOTAL: &str = "linklists_overlay_resolve_total";
pub(crate) const METRIC_STORE_TOTAL: &str = "linklists_overlay_store_total";
pub(crate) const METRIC_ORPHANED_TOTAL: &str = "linklists_overlay_orphaned_total";
pub(crate) const METRIC_PLUGIN_UNRESOLVED_TOTAL: &str = "linklists_plugin_unresolved_total";

/// Paths every locale may override regardless of plugin selection.
pub fn fixed_translatable_paths() -> [ConfigPath; 2] {
    [
        ConfigPath::new(["more", "title_override"]),
        ConfigPath::new(["more", "target"]),
    ]
}

#[derive(Debug, Clone)]
pub struct ConfigurationOverlayEngine {
    registry: Arc<PluginRegistry>,
    roles: Vec<PluginRole>,
}

impl ConfigurationOverlayEngine {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            roles: PluginRole::TRANSLATION_DEFAULTS.to_vec(),
        }
    }

    /// Replaces the roles whose plugins contribute translatable paths.
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = PluginRole>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn roles(&self) -> &[PluginRole] {
        &self.roles
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Translatable paths for the plugin selection in `canonical`.
    ///
    /// An unknown or unselected plugin contributes nothing. A role entry that
    /// is not a map fails with [`DomainError::InvalidPath`].
    pub fn compute_path_set(&self, canonical: &ConfigTree) -> Result<PathSet, DomainError> {
        let mut paths: PathSet = fixed_translatable_paths().into_iter().collect();

        for role in &self.roles {
            let Some(plugin_id) = canonical.get(&role.plugin_path())? else {
                continue;
            };
            let plugin_id = match plugin_id {
                Value::String(id) if !id.is_empty() => id.as_str(),
                Value::Null => continue,
                Value::String(_) => continue,
                other => {
                    debug!(
                        target = SOURCE,
                        role = %role,
                        value = %other,
                        "plugin selection is not a string; ignoring"
                    );
                    continue;
                }
            };

            let Some(plugin) = self.registry.get(*role, plugin_id) else {
                counter!(METRIC_PLUGIN_UNRESOLVED_TOTAL).increment(1);
                debug!(
                    target = SOURCE,
                    role = %role,
                    plugin = plugin_id,
                    "plugin is not registered; it contributes no translatable paths"
                );
                continue;
            };

            if let Some(capability) = plugin.translatable() {
                let base = role.configuration_path();
                paths.extend(
                    capability
                        .translatable_paths()
                        .iter()
                        .map(|relative| base.join(relative)),
                );
            }
        }

        Ok(paths)
    }

    /// Effective configuration for a locale.
    ///
    /// `None` (the canonical locale, or a locale with no stored overlay)
    /// yields a copy of `canonical`. Otherwise values present in `overlay` at
    /// translatable paths replace the canonical ones; nothing else changes.
    pub fn resolve(
        &self,
        canonical: &ConfigTree,
        overlay: Option<&ConfigTree>,
    ) -> Result<ConfigTree, DomainError> {
        counter!(METRIC_RESOLVE_TOTAL).increment(1);

        let Some(overlay) = overlay else {
            return Ok(canonical.clone());
        };

        let paths = self.compute_path_set(canonical)?;
        let mut resolved = canonical.clone();
        for path in &paths {
            // Shape conflicts on the overlay side are stale values, not errors.
            let value = match overlay.get(path) {
                Ok(value) => value,
                Err(DomainError::InvalidPath { reason, .. }) => {
                    debug!(
                        target = SOURCE,
                        path = %path,
                        reason = %reason,
                        "overlay value does not fit the translatable path; ignoring"
                    );
                    None
                }
                Err(err) => return Err(err),
            };
            if let Some(value) = value {
                resolved.set(path, value.clone())?;
            }
        }

        let orphaned = orphans(&paths, overlay);
        if !orphaned.is_empty() {
            counter!(METRIC_ORPHANED_TOTAL).increment(orphaned.len() as u64);
            debug!(
                target = SOURCE,
                count = orphaned.len(),
                paths = %join_paths(&orphaned),
                "ignoring overlay values outside the translatable paths"
            );
        }

        Ok(resolved)
    }

    /// Builds the overlay to persist for a submitted locale tree.
    ///
    /// The path set always comes from `canonical`, so whatever plugin ids
    /// `submitted` carries are dropped along with every other untranslatable
    /// value.
    pub fn store_translation(
        &self,
        canonical: &ConfigTree,
        submitted: &ConfigTree,
    ) -> Result<ConfigTree, DomainError> {
        counter!(METRIC_STORE_TOTAL).increment(1);

        let paths = self.compute_path_set(canonical)?;
        let mut overlay = ConfigTree::new();
        for path in &paths {
            if let Some(value) = submitted.get(path)? {
                overlay.set(path, value.clone())?;
            }
        }

        debug!(
            target = SOURCE,
            translatable = paths.len(),
            stored = overlay.leaf_paths().len(),
            "extracted translation overlay"
        );

        Ok(overlay)
    }

    /// Overlay leaves that the current canonical selection no longer covers.
    ///
    /// Nothing is removed; a host wanting to clean up can re-run
    /// [`store_translation`](Self::store_translation) with the resolved tree.
    pub fn orphaned_paths(
        &self,
        canonical: &ConfigTree,
        overlay: &ConfigTree,
    ) -> Result<Vec<ConfigPath>, DomainError> {
        let paths = self.compute_path_set(canonical)?;
        Ok(orphans(&paths, overlay))
    }
}

fn orphans(paths: &PathSet, overlay: &ConfigTree) -> Vec<ConfigPath> {
    overlay
        .leaf_paths()
        .into_iter()
        .filter(|leaf| !paths.covers(leaf))
        .collect()
}

fn join_paths(paths: &[ConfigPath]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

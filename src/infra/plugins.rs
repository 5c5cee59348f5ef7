//! Plugins described in configuration rather than compiled in.
//!
//! The binary has no strategy implementations of its own; it only needs each
//! plugin's id and the paths it declares translatable.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::PluginSettings;
use crate::domain::path::ConfigPath;
use crate::domain::plugin::{PluginRegistry, StrategyPlugin, TranslatableCapability};

const SOURCE: &str = "linklists::infra::plugins";

#[derive(Debug, Clone)]
pub struct DeclaredPlugin {
    id: String,
    translatable: Option<Vec<ConfigPath>>,
}

impl DeclaredPlugin {
    /// A plugin without the translatable capability.
    pub fn plain(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            translatable: None,
        }
    }

    pub fn translatable(id: impl Into<String>, paths: Vec<ConfigPath>) -> Self {
        Self {
            id: id.into(),
            translatable: Some(paths),
        }
    }
}

impl StrategyPlugin for DeclaredPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn translatable(&self) -> Option<&dyn TranslatableCapability> {
        self.translatable
            .as_ref()
            .map(|_| self as &dyn TranslatableCapability)
    }
}

impl TranslatableCapability for DeclaredPlugin {
    fn translatable_paths(&self) -> Vec<ConfigPath> {
        self.translatable.clone().unwrap_or_default()
    }
}

/// Builds a registry from `plugins.<role>.<id>` declarations. Declarations
/// with no translatable paths register plugins without the capability.
pub fn registry_from_settings(settings: &PluginSettings) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for decl in &settings.declarations {
        let plugin = if decl.translatable.is_empty() {
            DeclaredPlugin::plain(decl.id.clone())
        } else {
            DeclaredPlugin::translatable(decl.id.clone(), decl.translatable.clone())
        };

        if registry.register(decl.role, Arc::new(plugin)).is_some() {
            warn!(
                target = SOURCE,
                role = %decl.role,
                plugin = %decl.id,
                "plugin declared twice; keeping the last declaration"
            );
        }
    }

    debug!(target = SOURCE, plugins = registry.len(), "built plugin registry");
    registry
}

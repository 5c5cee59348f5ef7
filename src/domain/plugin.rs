//! Strategy plugin contracts and the registry the overlay engine consults.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::path::ConfigPath;

/// Slot a strategy plugin occupies in a link list configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginRole {
    /// Where links come from.
    Source,
    /// How links are displayed.
    Display,
    /// What to show when the source yields nothing.
    NoResultsBehaviour,
}

impl PluginRole {
    /// Roles whose plugins contribute translatable paths unless a host opts in to more.
    pub const TRANSLATION_DEFAULTS: [PluginRole; 2] = [PluginRole::Source, PluginRole::Display];

    pub fn as_str(self) -> &'static str {
        match self {
            PluginRole::Source => "source",
            PluginRole::Display => "display",
            PluginRole::NoResultsBehaviour => "no_results_behaviour",
        }
    }

    /// `<role>.plugin`: where the selected plugin id lives.
    pub fn plugin_path(self) -> ConfigPath {
        ConfigPath::new([self.as_str(), "plugin"])
    }

    /// `<role>.plugin_configuration`: the plugin's own sub-tree.
    pub fn configuration_path(self) -> ConfigPath {
        ConfigPath::new([self.as_str(), "plugin_configuration"])
    }
}

impl fmt::Display for PluginRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PluginRole {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "source" => Ok(PluginRole::Source),
            "display" => Ok(PluginRole::Display),
            "no_results_behaviour" => Ok(PluginRole::NoResultsBehaviour),
            _ => Err(()),
        }
    }
}

/// Optional capability: declares which parts of the plugin's configuration
/// may differ between locales. Paths are relative to the plugin's
/// `plugin_configuration` sub-tree.
pub trait TranslatableCapability {
    fn translatable_paths(&self) -> Vec<ConfigPath>;
}

pub trait StrategyPlugin: Send + Sync {
    fn id(&self) -> &str;

    /// Capability check used instead of downcasting; `None` means the plugin
    /// has nothing translatable.
    fn translatable(&self) -> Option<&dyn TranslatableCapability> {
        None
    }
}

/// Plugins available to the overlay engine, keyed by role and plugin id.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<PluginRole, HashMap<String, Arc<dyn StrategyPlugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `role`, returning any plugin it replaced.
    pub fn register(
        &mut self,
        role: PluginRole,
        plugin: Arc<dyn StrategyPlugin>,
    ) -> Option<Arc<dyn StrategyPlugin>> {
        self.plugins
            .entry(role)
            .or_default()
            .insert(plugin.id().to_string(), plugin)
    }

    pub fn with(mut self, role: PluginRole, plugin: Arc<dyn StrategyPlugin>) -> Self {
        self.register(role, plugin);
        self
    }

    pub fn get(&self, role: PluginRole, id: &str) -> Option<&Arc<dyn StrategyPlugin>> {
        self.plugins.get(&role).and_then(|plugins| plugins.get(id))
    }

    pub fn len(&self) -> usize {
        self.plugins.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: BTreeMap<&str, Vec<&str>> = self
            .plugins
            .iter()
            .map(|(role, plugins)| {
                let mut ids: Vec<&str> = plugins.keys().map(String::as_str).collect();
                ids.sort_unstable();
                (role.as_str(), ids)
            })
            .collect();
        f.debug_struct("PluginRegistry").field("plugins", &ids).finish()
    }
}

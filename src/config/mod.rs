//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::BTreeMap, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::{
    ids::{LinkListId, Locale},
    path::ConfigPath,
    plugin::PluginRole,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "linklists";
const DEFAULT_STORAGE_DIR: &str = "linklists-data";
const DEFAULT_LOCALE: &str = "en";

/// Command-line arguments for the linklists binary.
#[derive(Debug, Parser)]
#[command(
    name = "linklists",
    version,
    about = "Inspect and translate link list configuration"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "LINKLISTS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the translatable paths of a link list.
    Paths(ListArgs),
    /// Print the effective configuration for a locale.
    Resolve(ResolveArgs),
    /// Store the translatable part of a locale's configuration.
    Translate(TranslateArgs),
    /// Replace a link list's canonical configuration.
    Import(ImportArgs),
    /// Print overlay paths the current plugin selection ignores.
    Orphans(OrphansArgs),
}

impl Command {
    pub fn overrides(&self) -> &CommonOverrides {
        match self {
            Command::Paths(args) => &args.overrides,
            Command::Resolve(args) => &args.overrides,
            Command::Translate(args) => &args.overrides,
            Command::Import(args) => &args.overrides,
            Command::Orphans(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
    /// Override the storage directory.
    #[arg(long = "storage-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub storage_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Link list identifier.
    #[arg(value_name = "LIST", value_parser = parse_list_id)]
    pub list: LinkListId,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "LIST", value_parser = parse_list_id)]
    pub list: LinkListId,

    /// Locale to resolve; defaults to `locale.default`.
    #[arg(long, value_name = "LOCALE", value_parser = parse_locale)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Args, Clone)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "LIST", value_parser = parse_list_id)]
    pub list: LinkListId,

    #[arg(long, value_name = "LOCALE", value_parser = parse_locale)]
    pub locale: Locale,

    /// TOML file holding the submitted configuration.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "LIST", value_parser = parse_list_id)]
    pub list: LinkListId,

    /// TOML file holding the canonical configuration.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct OrphansArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "LIST", value_parser = parse_list_id)]
    pub list: LinkListId,

    #[arg(long, value_name = "LOCALE", value_parser = parse_locale)]
    pub locale: Locale,
}

fn parse_list_id(value: &str) -> Result<LinkListId, String> {
    LinkListId::from_str(value).map_err(|err| err.to_string())
}

fn parse_locale(value: &str) -> Result<Locale, String> {
    Locale::from_str(value).map_err(|err| err.to_string())
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
    pub locale: LocaleSettings,
    pub plugins: PluginSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LocaleSettings {
    pub default: Locale,
}

/// Plugins declared in configuration, ordered by role then id.
#[derive(Debug, Clone, Default)]
pub struct PluginSettings {
    pub declarations: Vec<PluginDeclaration>,
}

impl PluginSettings {
    pub fn declares_role(&self, role: PluginRole) -> bool {
        self.declarations.iter().any(|decl| decl.role == role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDeclaration {
    pub role: PluginRole,
    pub id: String,
    /// Paths relative to the plugin's `plugin_configuration`.
    pub translatable: Vec<ConfigPath>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("LINKLISTS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(cli.command.overrides());

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    storage: RawStorageSettings,
    locale: RawLocaleSettings,
    plugins: BTreeMap<String, BTreeMap<String, RawPluginDeclaration>>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(dir) = overrides.storage_dir.as_ref() {
            self.storage.directory = Some(dir.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            logging: build_logging_settings(raw.logging)?,
            storage: StorageSettings {
                directory: raw
                    .storage
                    .directory
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR)),
            },
            locale: build_locale_settings(raw.locale)?,
            plugins: build_plugin_settings(raw.plugins)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_locale_settings(locale: RawLocaleSettings) -> Result<LocaleSettings, LoadError> {
    let raw = locale.default.unwrap_or_else(|| DEFAULT_LOCALE.to_string());
    let default =
        Locale::new(&raw).map_err(|err| LoadError::invalid("locale.default", err.to_string()))?;
    Ok(LocaleSettings { default })
}

fn build_plugin_settings(
    plugins: BTreeMap<String, BTreeMap<String, RawPluginDeclaration>>,
) -> Result<PluginSettings, LoadError> {
    let mut declarations = Vec::new();
    for (role_name, entries) in plugins {
        let role = PluginRole::try_from(role_name.as_str()).map_err(|()| {
            LoadError::invalid("plugins", format!("unknown plugin role `{role_name}`"))
        })?;

        for (id, entry) in entries {
            if id.trim().is_empty() {
                return Err(LoadError::invalid(
                    "plugins",
                    format!("plugin ids under `{role_name}` must not be empty"),
                ));
            }

            let translatable = entry
                .translatable
                .iter()
                .map(|path| {
                    ConfigPath::from_str(path).map_err(|err| {
                        LoadError::invalid(
                            "plugins",
                            format!("`{role_name}.{id}` has an invalid translatable path: {err}"),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            declarations.push(PluginDeclaration {
                role,
                id,
                translatable,
            });
        }
    }

    Ok(PluginSettings { declarations })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLocaleSettings {
    default: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPluginDeclaration {
    translatable: Vec<String>,
}

/// Parse CLI arguments and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;

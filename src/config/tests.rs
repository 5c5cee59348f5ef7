use std::io::Write;

use super::*;

#[test]
fn defaults_apply_without_any_source() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.storage.directory, PathBuf::from(DEFAULT_STORAGE_DIR));
    assert_eq!(settings.locale.default.as_str(), "en");
    assert!(settings.plugins.declarations.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.storage.directory = Some(PathBuf::from("/srv/lists"));
    raw.logging.level = Some("info".to_string());

    let overrides = CommonOverrides {
        storage_dir: Some(PathBuf::from("/tmp/lists")),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.storage.directory, PathBuf::from("/tmp/lists"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn invalid_log_level_names_the_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn invalid_default_locale_is_rejected() {
    let mut raw = RawSettings::default();
    raw.locale.default = Some("not a locale".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid locale");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "locale.default",
            ..
        }
    ));
}

#[test]
fn plugin_declarations_are_parsed_from_toml() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tempfile");
    writeln!(
        file,
        r#"
[locale]
default = "de"

[plugins.source.rss]
translatable = ["url", "feeds.0.label"]

[plugins.display.title]
translatable = ["label"]
"#
    )
    .expect("write config");

    let raw: RawSettings = Config::builder()
        .add_source(File::from(file.path()))
        .build()
        .expect("build")
        .try_deserialize()
        .expect("deserialize");
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.locale.default.as_str(), "de");
    assert_eq!(
        settings.plugins.declarations,
        vec![
            PluginDeclaration {
                role: PluginRole::Display,
                id: "title".to_string(),
                translatable: vec![ConfigPath::new(["label"])],
            },
            PluginDeclaration {
                role: PluginRole::Source,
                id: "rss".to_string(),
                translatable: vec![
                    ConfigPath::new(["url"]),
                    "feeds.0.label".parse().expect("path"),
                ],
            },
        ]
    );
    assert!(settings.plugins.declares_role(PluginRole::Source));
    assert!(!settings.plugins.declares_role(PluginRole::NoResultsBehaviour));
}

#[test]
fn unknown_plugin_roles_are_rejected() {
    let mut raw = RawSettings::default();
    raw.plugins
        .entry("more".to_string())
        .or_default()
        .insert("link".to_string(), RawPluginDeclaration::default());

    let err = Settings::from_raw(raw).expect_err("unknown role");
    assert!(err.to_string().contains("unknown plugin role `more`"), "{err}");
}

#[test]
fn malformed_translatable_paths_are_rejected() {
    let mut raw = RawSettings::default();
    raw.plugins.entry("source".to_string()).or_default().insert(
        "rss".to_string(),
        RawPluginDeclaration {
            translatable: vec!["url..label".to_string()],
        },
    );

    let err = Settings::from_raw(raw).expect_err("bad path");
    assert!(matches!(err, LoadError::Invalid { key: "plugins", .. }));
}

#[test]
fn parse_resolve_arguments() {
    let args = CliArgs::parse_from([
        "linklists",
        "resolve",
        "news",
        "--locale",
        "fr",
        "--storage-dir",
        "/tmp/lists",
    ]);

    match args.command {
        Command::Resolve(resolve) => {
            assert_eq!(resolve.list.as_str(), "news");
            assert_eq!(resolve.locale.map(|l| l.to_string()), Some("fr".to_string()));
            assert_eq!(
                resolve.overrides.storage_dir,
                Some(PathBuf::from("/tmp/lists"))
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_translate_arguments() {
    let args = CliArgs::parse_from([
        "linklists",
        "translate",
        "news",
        "--locale",
        "fr",
        "submitted.toml",
        "--log-json",
        "true",
    ]);

    match args.command {
        Command::Translate(translate) => {
            assert_eq!(translate.locale.as_str(), "fr");
            assert_eq!(translate.file, PathBuf::from("submitted.toml"));
            assert_eq!(translate.overrides.log_json, Some(true));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn invalid_list_ids_fail_to_parse() {
    let result = CliArgs::try_parse_from(["linklists", "paths", "News Lists"]);
    assert!(result.is_err());
}

use std::path::PathBuf;

use clap::Parser;
use linklists::config::{CliArgs, LoadError, load};
use serial_test::serial;

struct EnvGuard(&'static [&'static str]);

impl EnvGuard {
    fn set(vars: &'static [(&'static str, &'static str)], keys: &'static [&'static str]) -> Self {
        for (key, value) in vars {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::set_var(key, value) };
        }
        Self(keys)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            // SAFETY: see `EnvGuard::set`.
            unsafe { std::env::remove_var(key) };
        }
    }
}

#[test]
#[serial]
fn environment_overrides_file_defaults() {
    let _env = EnvGuard::set(
        &[
            ("LINKLISTS__STORAGE__DIRECTORY", "/var/lib/linklists"),
            ("LINKLISTS__LOCALE__DEFAULT", "fr"),
        ],
        &["LINKLISTS__STORAGE__DIRECTORY", "LINKLISTS__LOCALE__DEFAULT"],
    );

    let cli = CliArgs::parse_from(["linklists", "paths", "news"]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(
        settings.storage.directory,
        PathBuf::from("/var/lib/linklists")
    );
    assert_eq!(settings.locale.default.as_str(), "fr");
}

#[test]
#[serial]
fn cli_flags_beat_the_environment() {
    let _env = EnvGuard::set(
        &[("LINKLISTS__STORAGE__DIRECTORY", "/var/lib/linklists")],
        &["LINKLISTS__STORAGE__DIRECTORY"],
    );

    let cli = CliArgs::parse_from([
        "linklists",
        "paths",
        "news",
        "--storage-dir",
        "/tmp/override",
    ]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(settings.storage.directory, PathBuf::from("/tmp/override"));
}

#[test]
#[serial]
fn invalid_environment_values_are_reported() {
    let _env = EnvGuard::set(
        &[("LINKLISTS__LOGGING__LEVEL", "chatty")],
        &["LINKLISTS__LOGGING__LEVEL"],
    );

    let cli = CliArgs::parse_from(["linklists", "paths", "news"]);
    let err = load(&cli).expect_err("invalid level");

    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use linklists::{
    application::{
        error::AppError, link_lists::LinkListConfigService, overlay::ConfigurationOverlayEngine,
    },
    config::{self, Command, Settings},
    domain::{path::ConfigPath, plugin::PluginRole, tree::ConfigTree},
    infra::{
        error::InfraError,
        files::{FileConfigStore, read_tree_file},
        plugins::registry_from_settings,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

const SOURCE: &str = "linklists::main";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(target = SOURCE, error = %report.summary(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(target = SOURCE, error = %report.summary(), "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let service = build_service(&settings);

    match cli_args.command {
        Command::Paths(args) => {
            let paths = service.translatable_paths(&args.list).await?;
            print_paths(paths.iter())
        }
        Command::Resolve(args) => {
            let locale = args
                .locale
                .unwrap_or_else(|| service.default_locale().clone());
            let resolved = service.effective_configuration(&args.list, &locale).await?;
            print_tree(&resolved)
        }
        Command::Translate(args) => {
            let submitted = read_tree_file(&args.file).await?;
            let stored = service
                .save_translation(&args.list, &args.locale, &submitted)
                .await?;
            print_tree(&stored)
        }
        Command::Import(args) => {
            let canonical = read_tree_file(&args.file).await?;
            service.save_canonical(&args.list, &canonical).await?;
            info!(
                target = SOURCE,
                list = %args.list,
                file = %args.file.display(),
                "imported canonical configuration"
            );
            Ok(())
        }
        Command::Orphans(args) => {
            let orphans = service.orphaned_paths(&args.list, &args.locale).await?;
            print_paths(orphans.iter())
        }
    }
}

fn build_service(settings: &Settings) -> LinkListConfigService {
    let registry = Arc::new(registry_from_settings(&settings.plugins));

    let mut roles = PluginRole::TRANSLATION_DEFAULTS.to_vec();
    if settings.plugins.declares_role(PluginRole::NoResultsBehaviour) {
        roles.push(PluginRole::NoResultsBehaviour);
    }
    let engine = ConfigurationOverlayEngine::new(registry).with_roles(roles);

    let store = FileConfigStore::new(settings.storage.directory.clone());
    info!(
        target = SOURCE,
        storage = %store.root().display(),
        default_locale = %settings.locale.default,
        "configuration store ready"
    );

    LinkListConfigService::new(Arc::new(store), engine, settings.locale.default.clone())
}

fn print_paths<'a>(paths: impl Iterator<Item = &'a ConfigPath>) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    for path in paths {
        writeln!(stdout, "{path}").map_err(InfraError::from)?;
    }
    Ok(())
}

fn print_tree(tree: &ConfigTree) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(tree)
        .map_err(|err| InfraError::serialization(err.to_string()))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(InfraError::from)?;
    Ok(())
}

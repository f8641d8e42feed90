//! `lookup` - search several people-search sources at once.

mod cli;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use error::{CliError, Result};
use lookup_core::{AppConfig, SearchMode};
use lookup_search::{BackendFactory, SearchOrchestrator};
use lookup_sources::{SourceLoader, SourceRegistry};
use output::{ReportView, SourceView};
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};

/// Initialize tracing subscriber for structured logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lookup=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lookup failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if let Command::Config { save } = cli.command {
        if save {
            config.save()?;
            info!(path = %AppConfig::config_path()?.display(), "configuration saved");
        }
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let loader = match cli.sources.clone().or_else(|| config.search.sources_dir.clone()) {
        Some(dir) => SourceLoader::new(dir)?,
        None => SourceLoader::with_default_dir()?,
    };
    let registry = SourceRegistry::load_from(&loader)?;

    if matches!(cli.command, Command::Sources) {
        let views: Vec<SourceView> = registry.get_all().iter().map(SourceView::from).collect();
        return print_json(&views);
    }

    let orchestrator = BackendFactory::new(config).orchestrator(&registry);
    if orchestrator.backends().is_empty() {
        return Err(CliError::NoSources(
            loader.definitions_dir().display().to_string(),
        ));
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        sources = orchestrator.backends().len(),
        "starting lookup"
    );

    let failed = orchestrator.initialize().await;
    if !failed.is_empty() {
        info!(failed = failed.len(), "some sources are unavailable and will report errors");
    }

    let outcome = execute(&orchestrator, cli.command, cli.report).await;
    orchestrator.shutdown().await;
    outcome
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        None => AppConfig::load_with_env()?,
    };
    Ok(config)
}

async fn execute(orchestrator: &SearchOrchestrator, command: Command, report: bool) -> Result<()> {
    let (mode, query) = match command {
        Command::Name { query } => (SearchMode::Name, query.join(" ")),
        Command::Address { query } => (SearchMode::Address, query.join(" ")),
        Command::Phone { query } => (SearchMode::Phone, query),
        Command::Email { query } => (SearchMode::Email, query),
        Command::Person { id } => {
            let person = orchestrator.get_person_by_id(&id).await;
            return print_json(&person);
        }
        Command::Sources | Command::Config { .. } => return Ok(()),
    };

    if report {
        let report = orchestrator.search_with_report(mode, &query).await;
        print_json(&ReportView::from(&report))
    } else {
        let result = orchestrator.search(mode, &query).await;
        print_json(&result)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! CLI entrypoint for leadforge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use leadforge_application::{
    BatchProgressNotifier, NoProgress, ResolveConfigUseCase, ResolvedConfig, RunBatchError,
    RunBatchUseCase, RunContext, StoreError,
};
use leadforge_domain::RunState;
use leadforge_infrastructure::{
    AppSettings, CommandLeadTransaction, CsvAuditReport, FileConfigSource, LocationCandidates,
    RunParametersFile, SettingsLoader,
};
use leadforge_presentation::{
    Cli, Command, ConsoleFormatter, ProgressReporter, RunOverrides, SimpleProgress,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Configuration, settings or validation problem
const EXIT_CONFIG: u8 = 1;
/// A lead failed every attempt
const EXIT_EXHAUSTED: u8 = 2;
/// Another run holds the run-parameters lock
const EXIT_LOCKED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = SettingsLoader::load(cli.settings.as_ref())?;

    // File logging only for runs, next to the audit reports
    let log_dir = matches!(cli.command, Command::Run { .. })
        .then(|| settings.report_dir().join("logs"));
    let _guard = init_logging(cli.verbose, log_dir.as_deref());

    info!("Starting leadforge");

    // === Dependency Injection ===
    let locations = LocationCandidates::standard(&settings.paths);
    let source = Arc::new(FileConfigSource::new(locations.clone()));
    let resolver = ResolveConfigUseCase::new(
        Arc::clone(&source),
        settings.catalog()?,
        settings.paths.run_parameters.clone(),
    );

    match cli.command {
        Command::Check => Ok(check(&resolver, &locations)),
        Command::Show { overrides, json } => show(&resolver, &overrides, json),
        Command::Run {
            overrides,
            quiet,
            plain,
        } => {
            let progress: Box<dyn BatchProgressNotifier> = if quiet {
                Box::new(NoProgress)
            } else if plain {
                Box::new(SimpleProgress)
            } else {
                Box::new(ProgressReporter::new())
            };
            run_batch(
                &settings,
                &resolver,
                &source,
                &locations,
                &overrides,
                progress.as_ref(),
            )
            .await
        }
    }
}

fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let file_level = if verbose <= 1 { "info" } else { level };

    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let (file, guard) = match log_dir.map(open_log_appender) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(file_level));
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn open_log_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("leadforge.log")
        .build(dir)
        .with_context(|| format!("could not open log file in {}", dir.display()))
}

/// Load the run-parameter layer, apply command-line overrides, and merge.
///
/// With `locked`, the layer must be read from the file the run holds.
fn resolve(
    resolver: &ResolveConfigUseCase<FileConfigSource>,
    overrides: &RunOverrides,
    locked: Option<&Path>,
) -> Result<ResolvedConfig> {
    let (layer, origin) = match locked {
        Some(path) => resolver.load_run_parameters_from(path)?,
        None => resolver.load_run_parameters()?,
    };
    let layer = layer.with_overrides(overrides.pairs());
    Ok(resolver.resolve_run(layer, origin)?)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn check(
    resolver: &ResolveConfigUseCase<FileConfigSource>,
    locations: &LocationCandidates,
) -> ExitCode {
    let missing = resolver.verify_catalog();
    println!(
        "{}",
        ConsoleFormatter::format_catalog_check(&missing, locations.dirs())
    );
    if missing.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_CONFIG)
    }
}

fn show(
    resolver: &ResolveConfigUseCase<FileConfigSource>,
    overrides: &RunOverrides,
    json: bool,
) -> Result<ExitCode> {
    let resolved = resolve(resolver, overrides, None)?;

    if json {
        println!("{}", ConsoleFormatter::format_config_json(&resolved));
    } else {
        println!("{}", ConsoleFormatter::format_config(&resolved));
    }

    match RunState::from_config(&resolved.effective, today()) {
        Ok(state) => {
            if !json {
                println!("{}", ConsoleFormatter::format_run_state(&state));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            eprint!("{}", ConsoleFormatter::format_validation(&errors));
            Ok(ExitCode::from(EXIT_CONFIG))
        }
    }
}

async fn run_batch(
    settings: &AppSettings,
    resolver: &ResolveConfigUseCase<FileConfigSource>,
    source: &FileConfigSource,
    locations: &LocationCandidates,
    overrides: &RunOverrides,
    progress: &dyn BatchProgressNotifier,
) -> Result<ExitCode> {
    let transaction = CommandLeadTransaction::from_argv(&settings.transaction.command)
        .ok_or_else(|| anyhow!("transaction.command is not configured in the settings file"))?
        .with_timeout(settings.transaction_timeout())
        .with_working_dir(settings.transaction.working_dir.clone());

    // Lock before reading so two runs never start from the same cursor
    let run_parameters = &settings.paths.run_parameters;
    let target = source
        .locate(run_parameters)
        .unwrap_or_else(|| locations.primary(run_parameters));
    let store = match RunParametersFile::lock(&target) {
        Ok(store) => store,
        Err(StoreError::Locked(path)) => {
            eprintln!("Error: another run is in progress (lock held on {})", path);
            return Ok(ExitCode::from(EXIT_LOCKED));
        }
        Err(e) => return Err(e.into()),
    };
    info!("Run parameters: {}", store.path().display());

    let resolved = resolve(resolver, overrides, Some(store.path()))?;
    let state = match RunState::from_config(&resolved.effective, today()) {
        Ok(state) => state,
        Err(errors) => {
            eprint!("{}", ConsoleFormatter::format_validation(&errors));
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };
    if state.is_new_epoch() {
        info!("New numbering epoch for {}", state.epoch_date);
    }

    let audit = CsvAuditReport::create(
        &settings.report_dir(),
        state.environment,
        state.epoch_date,
        state.customer_type,
        state.last_successful_before_run(),
    )?;
    info!("Audit report: {}", audit.path().display());

    let context = RunContext::new(state, resolved.effective);
    let use_case =
        RunBatchUseCase::new(Arc::new(transaction)).with_params(settings.batch_params());

    match use_case
        .execute_with_progress(&context, &audit, &store, progress)
        .await
    {
        Ok(summary) => {
            println!("{}", ConsoleFormatter::format_summary(&summary));
            Ok(ExitCode::SUCCESS)
        }
        Err(RunBatchError::Validation(errors)) => {
            eprint!("{}", ConsoleFormatter::format_validation(&errors));
            Ok(ExitCode::from(EXIT_CONFIG))
        }
        Err(e @ RunBatchError::ExhaustedAfterRetries { .. }) => {
            if let Some(summary) = e.summary() {
                println!("{}", ConsoleFormatter::format_summary(summary));
            }
            eprintln!("Error: {}", e);
            eprintln!("The next run resumes at this ordinal.");
            Ok(ExitCode::from(EXIT_EXHAUSTED))
        }
        Err(e @ RunBatchError::Persist { .. }) => {
            if let Some(summary) = e.summary() {
                println!("{}", ConsoleFormatter::format_summary(summary));
            }
            warn!("Update {} by hand before the next run", store.path().display());
            eprintln!("Error: {}", e);
            Ok(ExitCode::from(EXIT_CONFIG))
        }
    }
}

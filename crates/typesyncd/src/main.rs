// # typesync - TypeScript type synchronization daemon
//
// This binary is a thin integration layer over typesync-core:
// 1. Parse the command line
// 2. Load the configuration file and initialize logging
// 3. Wire the HTTP spec source and the CLI generator into the engine
//
// All orchestration logic (coalescing, triggers, serving) lives in
// typesync-core; generation and fetching live in their own crates.
//
// ## Commands
//
// - `typesync`           run the daemon: serve /types and keep the
//                        artifact in sync via the configured trigger
// - `typesync generate`  run the pipeline once and exit 0/1
// - `typesync init`      interactively create ts-openapi.config.json
//
// ## Configuration
//
// Read from `ts-openapi.config.json` in the working directory. A missing
// file is a startup error that points at `typesync init`.

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use typesync_core::config::{CONFIG_FILE_NAME, Config};
use typesync_core::engine::SyncEngine;
use typesync_core::pipeline::Pipeline;
use typesync_generator_exec::ExecGenerator;
use typesync_source_http::HttpSpecSource;

mod init;

/// Keep generated TypeScript types in sync with an OpenAPI document
#[derive(Parser)]
#[command(name = "typesync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create ts-openapi.config.json interactively
    Init,
    /// Fetch the spec and regenerate types once, then exit
    Generate,
}

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown / successful generation
/// - 1: Configuration or startup error, or a failed one-shot generation
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error, startup failure, or failed generation
    Failure = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // `init` runs before any configuration exists and needs no runtime
    if let Some(Command::Init) = cli.command {
        return match init::run(Path::new(CONFIG_FILE_NAME)) {
            Ok(()) => SyncExitCode::CleanShutdown.into(),
            Err(e) => {
                eprintln!("Initialization error: {}", e);
                SyncExitCode::Failure.into()
            }
        };
    }

    // Load configuration from the working directory
    let config = match Config::load(Path::new(CONFIG_FILE_NAME)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::Failure.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level.as_tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::Failure.into();
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let one_shot = matches!(cli.command, Some(Command::Generate));
    let result = rt.block_on(async {
        if one_shot {
            run_generate(config).await
        } else {
            run_daemon(config).await
        }
    });

    result.into()
}

/// Build the pipeline collaborators from the configuration
fn collaborators(config: &Config) -> (HttpSpecSource, ExecGenerator) {
    (
        HttpSpecSource::new(config.spec_url.clone()),
        ExecGenerator::new(),
    )
}

/// Run the pipeline once and report the outcome via the exit status
async fn run_generate(config: Config) -> SyncExitCode {
    let (source, generator) = collaborators(&config);
    let pipeline = Pipeline::new(
        Box::new(source),
        Box::new(generator),
        config.output_path.clone().into(),
    );

    match pipeline.run().await {
        Ok(()) => {
            info!("Types generated at {}", config.output_path);
            SyncExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Error generating types: {}", e);
            SyncExitCode::Failure
        }
    }
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: Config) -> SyncExitCode {
    info!("Starting typesync daemon");

    let (source, generator) = collaborators(&config);
    let (engine, mut event_rx) = SyncEngine::new(config, Box::new(source), Box::new(generator));

    // Drain run lifecycle events; the engine logs outcomes itself, these
    // are only surfaced at debug level for troubleshooting.
    let event_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            tracing::debug!(?event, "Coordinator event");
        }
    });

    let code = match engine.run().await {
        Ok(()) => SyncExitCode::CleanShutdown,
        Err(e) => {
            error!("Daemon error: {}", e);
            if e.is_fatal() {
                SyncExitCode::Failure
            } else {
                SyncExitCode::RuntimeError
            }
        }
    };

    event_task.abort();
    code
}

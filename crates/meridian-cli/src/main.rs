//! Meridian CLI - autonomous research workflow runner
//!
//! Usage:
//!   meridian init                 Write default config to the data directory
//!   meridian check                Run startup health checks and exit
//!   meridian run                  One workflow iteration
//!   meridian run --test           A short burst of back-to-back iterations
//!   meridian run --continuous 30  Iterate every 30 minutes until interrupted

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meridian_agents::{CatalogCurator, DryRunProposer, OpenAiReviewer};
use meridian_coordinator::ResearchCoordinator;
use meridian_core::MeridianConfig;
use meridian_runner::{
    run_health_check, OperationConfig, OperationLoop, OperationMode, RotatingSource,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "meridian")]
#[command(author, version, about = "Autonomous research workflow runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Data directory (config, activity log)
    #[arg(long, default_value = ".meridian")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Run startup health checks and exit
    Check,

    /// Run the research workflow
    Run {
        /// Iterate on an interval (minutes) until interrupted
        #[arg(long, value_name = "MINUTES", num_args = 0..=1, default_missing_value = "60")]
        continuous: Option<u64>,

        /// Run a short burst of back-to-back iterations
        #[arg(long, conflicts_with = "continuous")]
        test: bool,

        /// Stop after this many iterations (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_iterations: u64,

        /// Skip startup health checks
        #[arg(long)]
        no_health_check: bool,

        /// TOML file with [[hypotheses]] entries to cycle through
        #[arg(long, value_name = "FILE")]
        hypotheses: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => cmd_init(&cli.data_dir),
        Commands::Check => cmd_check(&cli.data_dir).await,
        Commands::Run {
            continuous,
            test,
            max_iterations,
            no_health_check,
            hypotheses,
        } => {
            cmd_run(
                &cli.data_dir,
                continuous,
                test,
                max_iterations,
                no_health_check,
                hypotheses,
            )
            .await
        }
    }
}

fn cmd_init(data_dir: &PathBuf) -> Result<ExitCode> {
    MeridianConfig::write_default(data_dir)
        .with_context(|| format!("failed to write config to {:?}", data_dir))?;
    println!("Wrote default config to {:?}", data_dir.join("meridian.toml"));
    Ok(ExitCode::SUCCESS)
}

async fn cmd_check(data_dir: &PathBuf) -> Result<ExitCode> {
    let config = MeridianConfig::load_or_default(data_dir)?;
    match run_health_check(&config).await {
        Ok(report) => {
            println!(
                "Health: ok (credentials: {}, endpoint: {})",
                report.credentials_ok, report.endpoint_ok
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Health: failed ({})", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_run(
    data_dir: &PathBuf,
    continuous: Option<u64>,
    test: bool,
    max_iterations: u64,
    no_health_check: bool,
    hypotheses: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = MeridianConfig::load_or_default(data_dir)?;

    let reviewer = OpenAiReviewer::from_config(&config.review)
        .context("reviewer setup failed (is the API key set?)")?;
    let curator = CatalogCurator::default();
    let proposer = DryRunProposer::new();

    let coordinator = ResearchCoordinator::new(reviewer, curator, proposer, config.clone())
        .with_activity_log(data_dir.clone());

    let source = match hypotheses {
        Some(path) => RotatingSource::from_file(&path)
            .with_context(|| format!("failed to load hypotheses from {:?}", path))?,
        None => RotatingSource::builtin(),
    };

    let mode = if test {
        OperationMode::Test
    } else if continuous.is_some() {
        OperationMode::Continuous
    } else {
        OperationMode::Single
    };
    let operation_config = OperationConfig {
        mode,
        interval_minutes: continuous.unwrap_or(60),
        max_iterations,
        enable_health_checks: !no_health_check,
    };

    let mut op_loop = OperationLoop::new(coordinator, source, operation_config);

    // First interrupt requests graceful shutdown; a second one forces exit
    let shutdown = op_loop.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current iteration");
            shutdown.store(true, Ordering::SeqCst);
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Forced exit");
            std::process::exit(1);
        }
    });

    let outcome = op_loop.run(&config).await;

    println!("\n{}", op_loop.render_final_state());

    match outcome {
        Ok(()) => {
            info!("Run complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Run failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

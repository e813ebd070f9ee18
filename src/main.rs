// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use repovault::utils::logging::{
    self, format_error, format_failure_detail, format_info, format_success,
};
use repovault::{
    BackupPipeline, BatchReport, Config, GitLabDirectory, GitTransfer, JobOutcome,
    RestorePipeline, VaultError,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "repovault")]
#[command(version = "0.1.0")]
#[command(about = "Mirror-based backup and restore for git hosting accounts", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror every repository reachable from an account to local storage
    Backup {
        host: String,

        #[arg(long)]
        dry_run: bool,
    },

    /// Re-publish a local mirror set to a (possibly different) account
    Restore {
        src_host: String,
        dst_host: String,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.color, cli.verbose);

    let config = if cli.config.exists() {
        match Config::load(Some(cli.config.as_path())).context("Failed to load configuration") {
            Ok(config) => config,
            Err(err) => {
                error!("{:#}", err);
                std::process::exit(1);
            }
        }
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    let result = match cli.command {
        Commands::Backup { ref host, dry_run } => cmd_backup(&config, host, dry_run).await,
        Commands::Restore {
            ref src_host,
            ref dst_host,
            dry_run,
        } => cmd_restore(&config, src_host, dst_host, dry_run).await,
    };

    if let Err(err) = result {
        error!("{:#}", err);
        // A restore against a host that was never backed up is its own
        // failure class, distinguishable by exit status.
        let code = match err.downcast_ref::<VaultError>() {
            Some(VaultError::MissingBackup { .. }) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn cmd_backup(config: &Config, host: &str, dry_run: bool) -> Result<()> {
    let host_config = config.host(host)?;

    let directory = Arc::new(GitLabDirectory::new(
        host_config.api_url.clone(),
        host_config.token.clone(),
    ));
    let transfer = Arc::new(GitTransfer::new());

    let pipeline = BackupPipeline::new(
        directory,
        transfer,
        config.backup.root.clone(),
        config.backup.concurrency,
    )?;

    let report = pipeline.run(host, dry_run).await?;
    print_summary(&format!("backup of {}", host), dry_run, &report);

    Ok(())
}

async fn cmd_restore(config: &Config, src_host: &str, dst_host: &str, dry_run: bool) -> Result<()> {
    let dst_config = config.host(dst_host)?;

    let directory = Arc::new(GitLabDirectory::new(
        dst_config.api_url.clone(),
        dst_config.token.clone(),
    ));
    let transfer = Arc::new(GitTransfer::new());

    let pipeline = RestorePipeline::new(
        directory,
        transfer,
        config.backup.root.clone(),
        config.backup.concurrency,
    )?;

    let report = pipeline.run(src_host, dst_host, dry_run).await?;
    print_summary(
        &format!("restore of {} to {}", src_host, dst_host),
        dry_run,
        &report,
    );

    Ok(())
}

fn print_summary(action: &str, dry_run: bool, report: &BatchReport) {
    if dry_run {
        println!("{}", format_info(&format!("{}: dry run, no transfers executed", action)));
        return;
    }

    if report.failed() == 0 {
        println!(
            "{}",
            format_success(&format!(
                "{}: {} transfers succeeded",
                action,
                report.attempted()
            ))
        );
    } else {
        println!(
            "{}",
            format_error(&format!(
                "{}: {} of {} transfers failed",
                action,
                report.failed(),
                report.attempted()
            ))
        );
        for failure in report.failures() {
            if let JobOutcome::Failed(reason) = &failure.outcome {
                println!("{}", format_failure_detail(&failure.label, reason));
            }
        }
    }
}

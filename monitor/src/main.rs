//! deploywatch - Entry Point
//!
//! Watches a project's recent deployments and reports new deployments and
//! state changes in the terminal.

use std::env;
use std::process::ExitCode;

use colored::Colorize;
use deploywatch::app::args::{parse_args, USAGE};
use deploywatch::app::options::MonitorOptions;
use deploywatch::app::run::run;
use deploywatch::errors::MonitorError;
use deploywatch::filesys::file::File;
use deploywatch::logs::init_logging;
use deploywatch::storage::settings::Settings;
use deploywatch::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = parse_args(env::args().skip(1));

    if cli_args.contains_key("help") || cli_args.contains_key("h") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("{}", e),
        }
        return ExitCode::SUCCESS;
    }

    let options = match load_options(&cli_args).await {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {}", "error:".bold().red(), e);
            eprintln!("Run with --help for usage");
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so buffered file logs get flushed
    let _log_guard = match init_logging(options.logging.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} failed to initialize logging: {}", "error:".bold().red(), e);
            return ExitCode::FAILURE;
        }
    };

    info!("Running deploywatch with options: {:?}", options);
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("deploywatch failed: {e}");
        eprintln!("{} {}", "error:".bold().red(), e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Defaults, then the optional settings file, then environment, then flags
async fn load_options(
    cli_args: &std::collections::HashMap<String, String>,
) -> Result<MonitorOptions, MonitorError> {
    let mut settings = match cli_args.get("config") {
        Some(path) => {
            let file = File::new(path);
            if !file.exists().await {
                return Err(MonitorError::ConfigError(format!(
                    "settings file not found: {}",
                    file.path().display()
                )));
            }
            file.read_json::<Settings>().await?
        }
        None => Settings::default(),
    };

    settings.apply_env(|key| env::var(key).ok())?;
    settings.apply_args(cli_args)?;

    MonitorOptions::try_from(settings)
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("Unable to listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}

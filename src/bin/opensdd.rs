//! Daemon entry point: parse arguments, set up logging, resolve a profile,
//! bring the driver up, and run until a termination signal arrives.

use clap::Parser;
use opensd::cli::{self, Cli};
use opensd::profile::loader;
use opensd::{Driver, ErrorKind};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(cli.log_level.as_filter()))
        .init();

    if !opensd::paths::is_installed() {
        tracing::warn!("installation check failed, attempting to run anyway");
    }

    let profile_path = match cli.profile.clone().or_else(opensd::paths::default_profile_path) {
        Some(path) => path,
        None => {
            tracing::error!("no profile specified and no default profile was found");
            return ExitCode::from(cli::exit_code_for(ErrorKind::FileNotFound) as u8);
        }
    };

    let profile = match loader::load(&profile_path) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(path = %profile_path.display(), error = %e, "failed to load profile");
            return ExitCode::from(cli::exit_code_for(e.kind) as u8);
        }
    };

    let driver = match Driver::new() {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize gamepad driver");
            return ExitCode::from(cli::exit_code_for(e.kind) as u8);
        }
    };

    if let Err(e) = driver.set_profile(&profile) {
        tracing::error!(error = %e, "failed to apply startup profile");
        return ExitCode::from(cli::exit_code_for(e.kind) as u8);
    }

    // `signal_hook::flag` sets this to true the moment SIGINT/SIGTERM arrives;
    // it starts false, not "running" — the poll loop below waits on it directly.
    let term = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term)) {
        tracing::warn!(error = %e, "failed to register SIGINT handler");
    }
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term)) {
        tracing::warn!(error = %e, "failed to register SIGTERM handler");
    }

    tracing::info!(profile = %profile.name, "starting driver");
    driver.start();

    while !term.load(Ordering::Relaxed) {
        std::thread::sleep(std::time::Duration::from_millis(200));
    }

    tracing::info!("shutting down");
    driver.stop();

    ExitCode::SUCCESS
}

use std::path::PathBuf;
use std::process::ExitCode;

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::cli::Cli;
use crate::config::LauncherConfig;
use crate::engine::{Deployer, LauncherEngine};
use crate::error::{LauncherError, LauncherResult};
use crate::networking::NetworkClient;

mod archive;
mod cli;
mod config;
mod engine;
mod env;
mod error;
mod logging;
mod mods;
mod networking;
mod process;
mod protocol;
mod util;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_normalized(std::env::args_os());

    let root = match env::default_app_dir().and_then(|root| {
        env::ensure_base_dirs(&root)?;
        Ok(root)
    }) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("leeklaunch: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&env::logs_dir(&root));

    match run(cli, root).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, root: PathBuf) -> LauncherResult<()> {
    let config = LauncherConfig::load(root)?;

    let self_path =
        std::env::current_exe().map_err(|e| LauncherError::io("<current executable>", e))?;
    info!(
        "leeklaunch {} started from {}",
        env!("CARGO_PKG_VERSION"),
        self_path.display()
    );

    info!("attempting to (re)register protocols");
    protocol::register_protocols(&self_path)?;

    let actions = cli.actions();
    if actions.is_empty() {
        info!("nothing to do; pass -player, -reinstall or -patch");
        return Ok(());
    }

    let deployer = Deployer::new(&config, NetworkClient::new(&config.channel))
        .with_progress(install_progress());
    let engine = LauncherEngine::new(&config, deployer);
    for action in actions {
        engine.handle_action(action).await?;
    }
    Ok(())
}

fn install_progress() -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(0).with_style(style)
}

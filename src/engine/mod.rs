use std::fs;
use std::path::PathBuf;

use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::archive::{ExtractionRoot, extract_archive};
use crate::config::LauncherConfig;
use crate::engine::models::VersionInfo;
use crate::engine::state::{InstallState, UserAction, marker_path};
use crate::error::{LauncherError, LauncherResult};
use crate::mods::ModService;
use crate::networking::ReleaseSource;
use crate::process::ProcessLauncher;
use crate::util::format_size;

pub mod models;
pub mod state;

pub const APP_SETTINGS_FILE: &str = "AppSettings.xml";
pub const APP_SETTINGS: &str = "<Settings>
<ContentFolder>content</ContentFolder>
<BaseUrl>http://www.roblox.com</BaseUrl>
</Settings>";

/// Resolves the current client version and installs it under the versions dir.
pub struct Deployer<'a, S> {
    config: &'a LauncherConfig,
    source: S,
    progress: ProgressBar,
}

impl<'a, S: ReleaseSource> Deployer<'a, S> {
    pub fn new(config: &'a LauncherConfig, source: S) -> Self {
        Self {
            config,
            source,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn resolve(&self) -> LauncherResult<VersionInfo> {
        self.source.fetch_version_info(&self.config.channel).await
    }

    pub fn probe(&self, info: &VersionInfo) -> InstallState {
        InstallState::probe(self.config.version_dir(&info.client_version_upload))
    }

    /// Fetch the current version and return its directory, installing it first if needed.
    pub async fn ensure_installed(&self) -> LauncherResult<PathBuf> {
        let info = self.resolve().await?;
        self.ensure_version(&info).await
    }

    /// Install `info` unless its marker executable is already present.
    ///
    /// Only the marker is checked; contents of an installed directory are trusted as-is.
    pub async fn ensure_version(&self, info: &VersionInfo) -> LauncherResult<PathBuf> {
        match self.probe(info) {
            InstallState::Installed { version_dir } => {
                info!(
                    "deploy: {} already installed at {}",
                    info.client_version_upload,
                    version_dir.display()
                );
                Ok(version_dir)
            }
            InstallState::Missing { version_dir } => {
                info!(
                    "deploy: {} not installed at {}",
                    info.client_version_upload,
                    version_dir.display()
                );
                self.install(info).await
            }
        }
    }

    /// Download and extract every archive of `info`, then write the settings file.
    ///
    /// Runs over whatever is already in the version dir. The first failure aborts the
    /// install and leaves the partial tree behind; without the marker it is retried next run.
    pub async fn install(&self, info: &VersionInfo) -> LauncherResult<PathBuf> {
        let version_dir = self.config.version_dir(&info.client_version_upload);
        info!(
            "deploy: installing {} ({}) to {}",
            info.version,
            info.client_version_upload,
            version_dir.display()
        );

        debug!("deploy: bootstrapper version {}", info.bootstrapper_version);
        let manifest = self.source.fetch_manifest_archives(info).await?;
        if manifest.is_empty() {
            warn!("deploy: manifest for {} lists no archives", info.client_version_upload);
        } else {
            debug!("deploy: manifest lists {} archives", manifest.len());
        }

        fs::create_dir_all(&version_dir).map_err(|e| LauncherError::io(&version_dir, e))?;

        self.progress.set_length(manifest.len() as u64);
        self.progress.set_position(0);
        for archive in &manifest.archives {
            self.progress.set_message(archive.clone());

            let root = ExtractionRoot::for_archive(archive);
            if root == ExtractionRoot::Unmapped {
                self.progress.suspend(|| {
                    warn!("deploy: no extraction root known for {archive}; using the version root")
                });
            }

            let bytes = self.source.fetch_archive(info, archive).await?;
            self.progress.suspend(|| {
                info!(
                    "deploy: extracting {} ({}) to ./{}",
                    archive,
                    format_size(bytes.len() as u64),
                    root.relative().display()
                )
            });
            extract_archive(archive, &bytes, &root.resolve(&version_dir))?;
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        let settings_path = version_dir.join(APP_SETTINGS_FILE);
        fs::write(&settings_path, APP_SETTINGS)
            .map_err(|e| LauncherError::io(&settings_path, e))?;

        if !InstallState::probe(version_dir.clone()).is_installed() {
            warn!(
                "deploy: install finished but {} is missing; it will be retried next run",
                marker_path(&version_dir).display()
            );
        }
        info!("deploy: {} installed", info.client_version_upload);
        Ok(version_dir)
    }
}

/// Runs user actions against a deployment.
pub struct LauncherEngine<'a, S> {
    deployer: Deployer<'a, S>,
    mods: ModService,
    process: ProcessLauncher,
}

impl<'a, S: ReleaseSource> LauncherEngine<'a, S> {
    pub fn new(config: &'a LauncherConfig, deployer: Deployer<'a, S>) -> Self {
        Self {
            deployer,
            mods: ModService::new(config.mods_dir()),
            process: ProcessLauncher::new(config.launch_wrapper.clone()),
        }
    }

    pub async fn handle_action(&self, action: UserAction) -> LauncherResult<()> {
        match action {
            UserAction::Reinstall => {
                info!("action: reinstalling client");
                let info = self.deployer.resolve().await?;
                self.deployer.install(&info).await?;
                info!("action: reinstallation complete");
            }
            UserAction::Patch => {
                info!("action: applying file modifications");
                let version_dir = self.deployer.ensure_installed().await?;
                self.mods.apply(&version_dir)?;
            }
            UserAction::Launch { deeplink } => {
                info!("action: launching with deeplink {deeplink}");
                let version_dir = self.deployer.ensure_installed().await?;
                if let Err(err) = self.mods.apply(&version_dir) {
                    warn!("action: failed to patch file modifications, launching unpatched: {err}");
                }
                self.process
                    .spawn_detached(&marker_path(&version_dir), &[deeplink])?;
            }
        }
        Ok(())
    }
}

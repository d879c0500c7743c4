use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info};
use serde::Deserialize;

use crate::env;
use crate::error::{LauncherError, LauncherResult};

pub const DEFAULT_CHANNEL: &str = "LIVE";

/// On-disk `config.json`; every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ConfigFile {
    channel: String,
    launch_wrapper: Vec<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_owned(),
            launch_wrapper: Vec::new(),
        }
    }
}

/// Settings resolved once at startup and handed to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub root_dir: PathBuf,
    pub channel: String,
    /// Command prefix used to start the client, e.g. `["wine"]`.
    pub launch_wrapper: Vec<String>,
}

impl LauncherConfig {
    /// Load `config.json` from `root_dir`, falling back to defaults when it is absent.
    pub fn load(root_dir: impl Into<PathBuf>) -> LauncherResult<Self> {
        let root_dir = root_dir.into();
        let path = env::config_file(&root_dir);
        let file = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<ConfigFile>(&bytes)
                .map_err(|source| LauncherError::Config {
                    path: path.clone(),
                    source,
                })?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("config: {} not found, using defaults", path.display());
                ConfigFile::default()
            }
            Err(err) => return Err(LauncherError::io(&path, err)),
        };

        let channel = match file.channel.trim() {
            "" => DEFAULT_CHANNEL.to_owned(),
            channel => channel.to_owned(),
        };
        info!("config: root={} channel={}", root_dir.display(), channel);

        Ok(Self {
            root_dir,
            channel,
            launch_wrapper: file.launch_wrapper,
        })
    }

    pub fn version_dir(&self, client_version_upload: &str) -> PathBuf {
        env::version_dir(&self.root_dir, client_version_upload)
    }

    pub fn mods_dir(&self) -> PathBuf {
        env::mods_dir(&self.root_dir)
    }
}

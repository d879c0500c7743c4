use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type shared by every launcher component.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid package manifest: {0}")]
    Format(String),

    #[error("{archive} is not a valid zip archive: {source}")]
    ArchiveFormat {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("user config directory could not be determined")]
    NoConfigDir,
}

pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn network(url: &str, source: reqwest::Error) -> Self {
        LauncherError::Network {
            url: url.to_owned(),
            source,
        }
    }
}

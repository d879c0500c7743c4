use std::path::{Path, PathBuf};

/// Main client executable; its presence marks a version directory as installed.
pub const MARKER_FILE: &str = "RobloxPlayerBeta.exe";

/// On-disk state of one version directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallState {
    /// Marker executable present. Mods may have been applied on top.
    Installed { version_dir: PathBuf },
    /// Directory absent, or present without the marker (interrupted install).
    Missing { version_dir: PathBuf },
}

impl InstallState {
    pub fn probe(version_dir: PathBuf) -> Self {
        if marker_path(&version_dir).is_file() {
            InstallState::Installed { version_dir }
        } else {
            InstallState::Missing { version_dir }
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, InstallState::Installed { .. })
    }
}

pub fn marker_path(version_dir: &Path) -> PathBuf {
    version_dir.join(MARKER_FILE)
}

// Actions requested on the command line, run in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Reinstall,
    Patch,
    Launch { deeplink: String },
}

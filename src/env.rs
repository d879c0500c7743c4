use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LauncherError, LauncherResult};

pub const APP_NAME: &str = "leeklaunch";

/// Returns the launcher root inside the per-user configuration directory.
pub fn default_app_dir() -> LauncherResult<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(LauncherError::NoConfigDir)
}

pub fn versions_dir(root: &Path) -> PathBuf {
    root.join("versions")
}

pub fn version_dir(root: &Path, client_version_upload: &str) -> PathBuf {
    versions_dir(root).join(client_version_upload)
}

pub fn mods_dir(root: &Path) -> PathBuf {
    root.join("mods")
}

pub fn logs_dir(root: &Path) -> PathBuf {
    root.join("logs")
}

pub fn config_file(root: &Path) -> PathBuf {
    root.join("config.json")
}

/// Create the on-disk folder layout expected by the launcher.
///
/// The mods directory is left alone: it is user-owned and its absence is meaningful.
pub fn ensure_base_dirs(root: &Path) -> LauncherResult<()> {
    let folders = [root.to_path_buf(), versions_dir(root), logs_dir(root)];

    for dir in folders {
        fs::create_dir_all(&dir).map_err(|e| LauncherError::io(&dir, e))?;
    }
    Ok(())
}

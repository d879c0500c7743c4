use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{LauncherError, LauncherResult};

/// Files copied by one overlay pass, relative to the mods root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayReport {
    pub applied: Vec<PathBuf>,
}

/// Copies the user's mods tree over an installed version.
#[derive(Clone, Debug)]
pub struct ModService {
    mods_dir: PathBuf,
}

impl ModService {
    pub fn new(mods_dir: PathBuf) -> Self {
        Self { mods_dir }
    }

    /// Overlay every regular file under the mods dir onto `version_dir`.
    ///
    /// Links to files are copied as their target. A missing mods dir is not an error. Files copied before a failure stay applied.
    pub fn apply(&self, version_dir: &Path) -> LauncherResult<OverlayReport> {
        let mut report = OverlayReport::default();

        if !self.mods_dir.exists() {
            info!(
                "mods: no mods directory at {}, skipping file patching",
                self.mods_dir.display()
            );
            return Ok(report);
        }
        if !self.mods_dir.is_dir() {
            warn!(
                "mods: {} is not a directory, skipping file patching",
                self.mods_dir.display()
            );
            return Ok(report);
        }

        for entry in WalkDir::new(&self.mods_dir).sort_by_file_name() {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.mods_dir.clone());
                LauncherError::io(path, io::Error::from(err))
            })?;
            let source = entry.path();
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                if !fs::metadata(source).is_ok_and(|meta| meta.is_file()) {
                    debug!("mods: skipping {}, link does not point at a file", source.display());
                    continue;
                }
            } else if !file_type.is_file() {
                continue;
            }

            let Ok(relative) = source.strip_prefix(&self.mods_dir) else {
                continue;
            };
            let target = version_dir.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
            }
            let contents = fs::read(source).map_err(|e| LauncherError::io(source, e))?;
            fs::write(&target, contents).map_err(|e| LauncherError::io(&target, e))?;

            debug!("mods: {} -> {}", source.display(), target.display());
            info!("mods: replacing asset {}", relative.display());
            report.applied.push(relative.to_path_buf());
        }

        info!(
            "mods: done replacing {} assets from {}",
            report.applied.len(),
            self.mods_dir.display()
        );
        Ok(report)
    }
}

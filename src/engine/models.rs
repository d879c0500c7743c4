use serde::{Deserialize, Serialize};

use crate::error::{LauncherError, LauncherResult};

pub const MANIFEST_FORMAT: &str = "v0";
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Client version metadata published for a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    /// Upload identifier (`version-<hash>`); names download URLs and the local version dir.
    pub client_version_upload: String,
    pub bootstrapper_version: String,
}

/// Archive list of one published version, in manifest order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    pub archives: Vec<String>,
}

impl Manifest {
    /// Parse `rbxPkgManifest.txt`.
    ///
    /// The first non-empty line must be the format token. Afterwards only lines naming
    /// a zip archive are kept; checksums, sizes and loose files are skipped.
    pub fn parse(text: &str) -> LauncherResult<Self> {
        let mut lines = text.lines().map(str::trim).skip_while(|line| line.is_empty());

        match lines.next() {
            Some(MANIFEST_FORMAT) => {}
            Some(other) => {
                return Err(LauncherError::Format(format!(
                    "expected format {MANIFEST_FORMAT}, found {other:?}"
                )));
            }
            None => return Err(LauncherError::Format("manifest is empty".into())),
        }

        let archives = lines
            .filter(|line| line.ends_with(ARCHIVE_EXTENSION))
            .map(str::to_owned)
            .collect();

        Ok(Self { archives })
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use zip::read::ZipArchive;

use crate::error::{LauncherError, LauncherResult};

/// Where an archive's entries land relative to the version directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionRoot {
    VersionRoot,
    Subdir(&'static str),
    /// Archive name not in the known layout. Extracted at the version root.
    Unmapped,
}

impl ExtractionRoot {
    pub fn for_archive(archive: &str) -> Self {
        use ExtractionRoot::{Subdir, Unmapped, VersionRoot};

        match archive {
            "RobloxApp.zip" | "redist.zip" | "WebView2.zip" => VersionRoot,
            "shaders.zip" => Subdir("shaders"),
            "ssl.zip" => Subdir("ssl"),
            "WebView2RuntimeInstaller.zip" => Subdir("WebView2RuntimeInstaller"),
            "content-avatar.zip" => Subdir("content/avatar"),
            "content-configs.zip" => Subdir("content/configs"),
            "content-fonts.zip" => Subdir("content/fonts"),
            "content-sky.zip" => Subdir("content/sky"),
            "content-sounds.zip" => Subdir("content/sounds"),
            "content-textures2.zip" => Subdir("content/textures"),
            "content-models.zip" => Subdir("content/models"),
            "content-platform-fonts.zip" => Subdir("PlatformContent/pc/fonts"),
            "content-platform-dictionaries.zip" => {
                Subdir("PlatformContent/pc/shared_compression_dictionaries")
            }
            "content-terrain.zip" => Subdir("PlatformContent/pc/terrain"),
            "content-textures3.zip" => Subdir("PlatformContent/pc/textures"),
            "extracontent-places.zip" => Subdir("ExtraContent/places"),
            "extracontent-luapackages.zip" => Subdir("ExtraContent/LuaPackages"),
            "extracontent-translations.zip" => Subdir("ExtraContent/translations"),
            "extracontent-models.zip" => Subdir("ExtraContent/models"),
            "extracontent-textures.zip" => Subdir("ExtraContent/textures"),
            _ => Unmapped,
        }
    }

    /// Path relative to the version directory; empty for the root.
    pub fn relative(self) -> &'static Path {
        match self {
            ExtractionRoot::Subdir(dir) => Path::new(dir),
            ExtractionRoot::VersionRoot | ExtractionRoot::Unmapped => Path::new(""),
        }
    }

    pub fn resolve(self, version_dir: &Path) -> PathBuf {
        match self {
            ExtractionRoot::Subdir(dir) => version_dir.join(dir),
            ExtractionRoot::VersionRoot | ExtractionRoot::Unmapped => version_dir.to_path_buf(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    /// Entries whose path would leave the destination.
    pub skipped: usize,
}

/// Unpack an in-memory zip into `dest`, overwriting existing files.
///
/// Nothing is rolled back on failure; entries written before the error stay on disk.
pub fn extract_archive(archive: &str, bytes: &[u8], dest: &Path) -> LauncherResult<ExtractSummary> {
    let mut zip =
        ZipArchive::new(Cursor::new(bytes)).map_err(|source| LauncherError::ArchiveFormat {
            archive: archive.to_owned(),
            source,
        })?;

    fs::create_dir_all(dest).map_err(|e| LauncherError::io(dest, e))?;

    let mut summary = ExtractSummary::default();
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|source| LauncherError::ArchiveFormat {
                archive: archive.to_owned(),
                source,
            })?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(
                "extract: skipping {} entry {:?}; path leaves the destination",
                archive,
                entry.name()
            );
            summary.skipped += 1;
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut out_file =
            fs::File::create(&out_path).map_err(|e| LauncherError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| LauncherError::io(&out_path, e))?;
        summary.files += 1;
    }

    debug!(
        "extract: {} -> {} ({} files, {} dirs, {} skipped)",
        archive,
        dest.display(),
        summary.files,
        summary.directories,
        summary.skipped
    );
    Ok(summary)
}


#[cfg(test)]
mod tests {
    use super::test_support::build_zip;
    use super::*;

    #[test]
    fn maps_known_archives() {
        assert_eq!(
            ExtractionRoot::for_archive("RobloxApp.zip"),
            ExtractionRoot::VersionRoot
        );
        assert_eq!(
            ExtractionRoot::for_archive("content-textures2.zip").relative(),
            Path::new("content/textures")
        );
        assert_eq!(
            ExtractionRoot::for_archive("content-platform-dictionaries.zip").relative(),
            Path::new("PlatformContent/pc/shared_compression_dictionaries")
        );
        assert_eq!(
            ExtractionRoot::for_archive("extracontent-luapackages.zip"),
            ExtractionRoot::Subdir("ExtraContent/LuaPackages")
        );
    }

    #[test]
    fn unknown_archive_goes_to_version_root() {
        let root = ExtractionRoot::for_archive("content-qtstyles.zip");
        assert_eq!(root, ExtractionRoot::Unmapped);
        assert_eq!(root.relative(), Path::new(""));
        assert_eq!(
            root.resolve(Path::new("/v/version-abc")),
            PathBuf::from("/v/version-abc")
        );
    }

    #[test]
    fn extracts_nested_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = build_zip(&[
            ("sounds/", b""),
            ("sounds/ui/", b""),
            ("sounds/ui/click.ogg", b"click"),
            ("ouch.ogg", b"ouch"),
        ]);

        let summary = extract_archive("content-sounds.zip", &bytes, tmp.path()).unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.directories, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            fs::read(tmp.path().join("sounds/ui/click.ogg")).unwrap(),
            b"click"
        );
        assert_eq!(fs::read(tmp.path().join("ouch.ogg")).unwrap(), b"ouch");
    }

    #[test]
    fn creates_parents_for_files_without_directory_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("content").join("sky");
        let bytes = build_zip(&[("sky512/sky_bk.tex", b"tex")]);

        extract_archive("content-sky.zip", &bytes, &dest).unwrap();

        assert_eq!(fs::read(dest.join("sky512/sky_bk.tex")).unwrap(), b"tex");
    }

    #[test]
    fn overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("AppSettings.xml"), "stale").unwrap();
        let bytes = build_zip(&[("AppSettings.xml", b"fresh")]);

        extract_archive("RobloxApp.zip", &bytes, tmp.path()).unwrap();

        assert_eq!(
            fs::read_to_string(tmp.path().join("AppSettings.xml")).unwrap(),
            "fresh"
        );
    }

    #[test]
    fn skips_entries_escaping_the_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("version");
        let bytes = build_zip(&[("../escaped.txt", b"nope"), ("kept.txt", b"yes")]);

        let summary = extract_archive("evil.zip", &bytes, &dest).unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.files, 1);
        assert!(!tmp.path().join("escaped.txt").exists());
        assert!(dest.join("kept.txt").is_file());
    }

    #[test]
    fn rejects_non_zip_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_archive("ssl.zip", b"<html>502 Bad Gateway</html>", tmp.path())
            .unwrap_err();
        match err {
            LauncherError::ArchiveFormat { archive, .. } => assert_eq!(archive, "ssl.zip"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

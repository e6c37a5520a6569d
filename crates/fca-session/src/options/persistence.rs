//! Options persistence - load and save options to disk.
//!
//! Options are stored in the platform-specific configuration folder:
//! - macOS: ~/Library/Application Support/org.fcatools.FCA-Workbench/
//! - Windows: %APPDATA%/fcatools/FCA Workbench/config/
//! - Linux: ~/.config/fcaworkbench/

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::{OptionsRecord, SessionOptions};
use crate::error::{Result, SessionError};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "fcatools";
const APP_NAME: &str = "FCA Workbench";
const OPTIONS_FILENAME: &str = "options.toml";

/// Path of the options file, if the platform has a config directory.
pub fn options_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(OPTIONS_FILENAME))
}

/// Loads options from the platform location.
///
/// `Ok(None)` means no options were ever stored (first run).
pub fn load_options() -> Result<Option<SessionOptions>> {
    let Some(path) = options_path() else {
        tracing::warn!("Could not determine options path, treating as first run");
        return Ok(None);
    };
    load_options_from(&path)
}

pub fn load_options_from(path: &Path) -> Result<Option<SessionOptions>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let record: OptionsRecord = toml::from_str(&content)
                .map_err(|e| SessionError::options(format!("{}: {e}", path.display())))?;
            tracing::info!("Loaded options from {:?}", path);
            Ok(Some(SessionOptions::from_record(record)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No options file found at {:?}", path);
            Ok(None)
        }
        Err(e) => Err(SessionError::options(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

/// Saves options to the platform location and returns the path written.
pub fn save_options(options: &SessionOptions) -> Result<PathBuf> {
    let path = options_path()
        .ok_or_else(|| SessionError::options("could not determine options path"))?;
    save_options_to(&path, options)?;
    Ok(path)
}

/// Creates the parent directory if it doesn't exist.
pub fn save_options_to(path: &Path, options: &SessionOptions) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SessionError::options(format!("failed to create config directory: {e}")))?;
    }
    let content = toml::to_string_pretty(&options.to_record())
        .map_err(|e| SessionError::options(format!("failed to serialize options: {e}")))?;
    fs::write(path, content)
        .map_err(|e| SessionError::options(format!("failed to write options file: {e}")))?;
    tracing::info!("Saved options to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{RecentFiles, WindowGeometry};

    #[test]
    fn missing_file_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_options_from(&dir.path().join("options.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_is_an_options_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "x = \"not a number\"").unwrap();
        let err = load_options_from(&path).unwrap_err();
        assert!(matches!(err, SessionError::Options { .. }));
    }

    #[test]
    fn round_trip_through_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("options.toml");
        let options = SessionOptions {
            geometry: WindowGeometry {
                x: 5,
                y: 6,
                w: 1200,
                h: 700,
            },
            last_opened: Some(PathBuf::from("/data/animals.json")),
            recent: RecentFiles::new([PathBuf::from("/data/old.json")]),
        };
        save_options_to(&path, &options).unwrap();
        assert_eq!(load_options_from(&path).unwrap(), Some(options));
    }

    #[test]
    fn partial_record_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "w = 640\nlastOpened = \"a.json\"\n").unwrap();
        let loaded = load_options_from(&path).unwrap().unwrap();
        assert_eq!(loaded.geometry.w, 640);
        assert_eq!(loaded.last_opened, Some(PathBuf::from("a.json")));
        assert!(loaded.recent.is_empty());
    }
}

//! Session options: window geometry, last opened file and recent files.
//!
//! Options are stored as a flat TOML record whose keys (`x`, `y`, `w`, `h`,
//! `lastOpened`, `lastOpened0`..`lastOpened4`) match the files written by
//! earlier releases. A missing file means first run.

pub mod persistence;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use persistence::{load_options, load_options_from, options_path, save_options, save_options_to};

/// Length of the recent-files list.
pub const MAX_RECENT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: 1000,
            h: 660,
        }
    }
}

/// Most recently used files, newest first, excluding the open one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn new<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut recent = Self::default();
        for path in paths {
            if !path.as_os_str().is_empty() && !recent.paths.contains(&path) {
                recent.paths.push(path);
            }
        }
        recent.paths.truncate(MAX_RECENT);
        recent
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Updates the list for a switch from `current` to `next`.
    ///
    /// `next` leaves the list; `current` moves to the front if it exists on
    /// disk. Switching to the open file changes nothing. Returns whether
    /// anything changed.
    pub fn switch(&mut self, current: &Path, current_exists: bool, next: &Path) -> bool {
        if current == next {
            return false;
        }
        let before = self.paths.clone();
        self.paths.retain(|p| p != next && p != current);
        if current_exists {
            self.paths.insert(0, current.to_path_buf());
        }
        self.paths.truncate(MAX_RECENT);
        self.paths != before
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub geometry: WindowGeometry,
    pub last_opened: Option<PathBuf>,
    pub recent: RecentFiles,
}

impl SessionOptions {
    /// Options to store on exit.
    ///
    /// The open file is remembered if it exists on disk, otherwise the first
    /// recent file is.
    pub fn capture(
        geometry: WindowGeometry,
        current: &Path,
        current_exists: bool,
        recent: &RecentFiles,
    ) -> Self {
        let last_opened = if current_exists {
            Some(current.to_path_buf())
        } else {
            recent.first().map(Path::to_path_buf)
        };
        Self {
            geometry,
            last_opened,
            recent: recent.clone(),
        }
    }

    pub fn to_record(&self) -> OptionsRecord {
        let mut slots = self
            .recent
            .paths()
            .iter()
            .map(|p| p.display().to_string())
            .chain(std::iter::repeat_with(String::new));
        let mut next = || slots.next().unwrap_or_default();
        OptionsRecord {
            x: self.geometry.x,
            y: self.geometry.y,
            w: self.geometry.w,
            h: self.geometry.h,
            last_opened: self
                .last_opened
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            last_opened0: next(),
            last_opened1: next(),
            last_opened2: next(),
            last_opened3: next(),
            last_opened4: next(),
        }
    }

    pub fn from_record(record: OptionsRecord) -> Self {
        let recent = RecentFiles::new(
            [
                record.last_opened0,
                record.last_opened1,
                record.last_opened2,
                record.last_opened3,
                record.last_opened4,
            ]
            .into_iter()
            .map(PathBuf::from),
        );
        let last_opened = Some(record.last_opened)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            geometry: WindowGeometry {
                x: record.x,
                y: record.y,
                w: record.w,
                h: record.h,
            },
            last_opened,
            recent,
        }
    }
}

/// On-disk shape of [`SessionOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsRecord {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(rename = "lastOpened")]
    pub last_opened: String,
    #[serde(rename = "lastOpened0")]
    pub last_opened0: String,
    #[serde(rename = "lastOpened1")]
    pub last_opened1: String,
    #[serde(rename = "lastOpened2")]
    pub last_opened2: String,
    #[serde(rename = "lastOpened3")]
    pub last_opened3: String,
    #[serde(rename = "lastOpened4")]
    pub last_opened4: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn switch_moves_current_to_front() {
        let mut recent = RecentFiles::new(paths(&["b.json", "c.json"]));
        assert!(recent.switch(Path::new("a.json"), true, Path::new("c.json")));
        assert_eq!(recent.paths(), paths(&["a.json", "b.json"]).as_slice());
    }

    #[test]
    fn switch_to_open_file_is_noop() {
        let mut recent = RecentFiles::new(paths(&["b.json"]));
        assert!(!recent.switch(Path::new("a.json"), true, Path::new("a.json")));
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn switch_skips_missing_current_and_truncates() {
        let mut recent = RecentFiles::new(paths(&["1", "2", "3", "4", "5"]));
        recent.switch(Path::new("untitled.json"), false, Path::new("3"));
        assert_eq!(recent.paths(), paths(&["1", "2", "4", "5"]).as_slice());
        recent.switch(Path::new("3"), true, Path::new("6"));
        assert_eq!(recent.paths(), paths(&["3", "1", "2", "4", "5"]).as_slice());
        recent.switch(Path::new("6"), true, Path::new("7"));
        assert_eq!(recent.len(), MAX_RECENT);
        assert_eq!(recent.first(), Some(Path::new("6")));
    }

    #[test]
    fn capture_prefers_existing_current() {
        let recent = RecentFiles::new(paths(&["old.json"]));
        let geometry = WindowGeometry::default();
        let stored = SessionOptions::capture(geometry, Path::new("open.json"), true, &recent);
        assert_eq!(stored.last_opened, Some(PathBuf::from("open.json")));
        let stored = SessionOptions::capture(geometry, Path::new("gone.json"), false, &recent);
        assert_eq!(stored.last_opened, Some(PathBuf::from("old.json")));
        let stored =
            SessionOptions::capture(geometry, Path::new("gone.json"), false, &RecentFiles::default());
        assert_eq!(stored.last_opened, None);
    }

    #[test]
    fn record_uses_legacy_keys() {
        let options = SessionOptions {
            geometry: WindowGeometry {
                x: 10,
                y: 20,
                w: 800,
                h: 600,
            },
            last_opened: Some(PathBuf::from("a.json")),
            recent: RecentFiles::new(paths(&["b.json"])),
        };
        let text = toml::to_string(&options.to_record()).unwrap();
        assert!(text.contains("lastOpened = \"a.json\""));
        assert!(text.contains("lastOpened0 = \"b.json\""));
        assert!(text.contains("lastOpened4 = \"\""));
        let parsed: OptionsRecord = toml::from_str(&text).unwrap();
        assert_eq!(SessionOptions::from_record(parsed), options);
    }
}

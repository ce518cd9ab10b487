#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Modification-time state for incremental compression
//!
//! The state file remembers, per source file, the modification time that was
//! seen when the file was last compressed. One record per line:
//!
//! ```text
//! 6650a1c3,maps/dm_flood.bsp
//! ```
//!
//! The time is whole seconds since the Unix epoch in lower-case hex, at least
//! eight digits wide. Paths are relative to the source directory and always
//! use `/` as separator, so a state file written on Windows is valid on Linux
//! and the other way round.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use bubz2_errors::{Error, StateError};
use tracing::{debug, warn};

/// In-memory view of a state file
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    entries: BTreeMap<String, u64>,
    dirty: bool,
}

impl StateFile {
    /// An empty state that will be saved to `path`
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load the state stored at `path`, or start empty if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or contains a
    /// malformed record.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let mut state = Self::empty(path);
        let contents = match tokio::fs::read_to_string(&state.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %state.path.display(), "no state file yet, starting empty");
                return Ok(state);
            }
            Err(e) => {
                return Err(StateError::ReadFailed {
                    path: state.path.display().to_string(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        state.parse(&contents)?;
        debug!(path = %state.path.display(), records = state.len(), "loaded state file");
        Ok(state)
    }

    /// Add every record in `contents`; later records for a path win.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first malformed line.
    pub fn parse(&mut self, contents: &str) -> Result<(), Error> {
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = |message: String| StateError::MalformedRecord {
                path: self.path.display().to_string(),
                line: index + 1,
                message,
            };
            let (time, path) = line
                .split_once(',')
                .ok_or_else(|| malformed("expected time and path".to_string()))?;
            let time = u64::from_str_radix(time, 16)
                .map_err(|e| malformed(format!("invalid time '{time}': {e}")))?;
            if path.is_empty() {
                return Err(malformed("empty path".to_string()).into());
            }
            self.entries.insert(record_key(path), time);
        }
        Ok(())
    }

    /// Path the state is saved to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last recorded modification time of `relative`, in seconds since the
    /// Unix epoch
    #[must_use]
    pub fn time_of(&self, relative: &Path) -> Option<u64> {
        let key = state_key(relative)?;
        self.entries.get(&key).copied()
    }

    /// Record `time` for `relative`. Returns `false` if the path cannot be
    /// stored.
    ///
    /// Paths that are not valid UTF-8 cannot be stored; they are skipped with
    /// a warning and will be compressed again on every run.
    pub fn set_time_of(&mut self, relative: &Path, time: u64) -> bool {
        let Some(key) = state_key(relative) else {
            warn!(path = %relative.display(), "path is not valid UTF-8, not recording it");
            return false;
        };
        if self.entries.insert(key, time) != Some(time) {
            self.dirty = true;
        }
        true
    }

    /// Drop records whose path is not in `seen`. Returns how many were dropped.
    pub fn retain_paths(&mut self, seen: &HashSet<PathBuf>) -> usize {
        let keep: HashSet<String> = seen.iter().filter_map(|p| state_key(p)).collect();
        let before = self.entries.len();
        self.entries.retain(|key, _| keep.contains(key));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            self.dirty = true;
        }
        dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether there are changes not yet saved
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Render all records, sorted by path
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (path, time) in &self.entries {
            let _ = writeln!(out, "{time:08x},{path}");
        }
        out
    }

    /// Write the state next to its final location and rename it into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    pub async fn save(&mut self) -> Result<(), Error> {
        let write_failed = |e: &std::io::Error| StateError::WriteFailed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(&e))?;
        }

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        if let Err(e) = tokio::fs::write(&tmp_path, self.render()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_failed(&e).into());
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_failed(&e).into());
        }

        self.dirty = false;
        debug!(path = %self.path.display(), records = self.len(), "saved state file");
        Ok(())
    }
}

/// Key for a path read from a state file. Windows writers may have used `\`
/// as the separator; elsewhere a backslash is part of the file name.
fn record_key(path: &str) -> String {
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

/// Portable key for a relative path: normal components joined with `/`
fn state_key(relative: &Path) -> Option<String> {
    let mut key = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                if !key.is_empty() {
                    key.push('/');
                }
                key.push_str(part.to_str()?);
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records() {
        let mut state = StateFile::empty(".fastdl");
        state
            .parse("6650a1c3,maps/dm_flood.bsp\n\n0000000a,sound/wind.wav\r\n")
            .unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.time_of(Path::new("maps/dm_flood.bsp")), Some(0x6650_a1c3));
        assert_eq!(state.time_of(Path::new("sound/wind.wav")), Some(10));
    }

    #[cfg(windows)]
    #[test]
    fn test_parse_accepts_windows_separators() {
        let mut state = StateFile::empty(".fastdl");
        state.parse("0000000a,sound\\wind.wav\n").unwrap();
        assert_eq!(state.time_of(Path::new("sound/wind.wav")), Some(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_is_part_of_unix_file_names() {
        let mut state = StateFile::empty(".fastdl");
        assert!(state.set_time_of(Path::new("a\\b.txt"), 7));
        let rendered = state.render();
        assert_eq!(rendered, "00000007,a\\b.txt\n");

        let mut reopened = StateFile::empty(".fastdl");
        reopened.parse(&rendered).unwrap();
        assert_eq!(reopened.time_of(Path::new("a\\b.txt")), Some(7));
        assert_eq!(reopened.time_of(Path::new("a/b.txt")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_not_recorded() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut state = StateFile::empty(".fastdl");
        let path = Path::new(OsStr::from_bytes(b"caf\xe9.wav"));
        assert!(!state.set_time_of(path, 1));
        assert!(state.is_empty());
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_parse_later_record_wins() {
        let mut state = StateFile::empty(".fastdl");
        state.parse("00000001,a.txt\n00000002,a.txt\n").unwrap();
        assert_eq!(state.time_of(Path::new("a.txt")), Some(2));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let mut state = StateFile::empty(".fastdl");
        let err = state.parse("00000001,a.txt\nnot a record\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "state error: .fastdl:2: expected time and path"
        );

        let err = state.parse("zz,a.txt\n").unwrap_err();
        assert!(err.to_string().contains(".fastdl:1: invalid time 'zz'"));

        assert!(state.parse("00000001,\n").is_err());
    }

    #[test]
    fn test_render_is_sorted_and_padded() {
        let mut state = StateFile::empty(".fastdl");
        state.set_time_of(Path::new("b.txt"), 0x1_0000_0000);
        state.set_time_of(Path::new("a.txt"), 5);
        assert_eq!(state.render(), "00000005,a.txt\n100000000,b.txt\n");
    }

    #[test]
    fn test_dirty_tracking() {
        let mut state = StateFile::empty(".fastdl");
        assert!(!state.is_dirty());
        state.parse("00000005,a.txt\n").unwrap();
        assert!(!state.is_dirty());
        state.set_time_of(Path::new("a.txt"), 5);
        assert!(!state.is_dirty());
        state.set_time_of(Path::new("a.txt"), 6);
        assert!(state.is_dirty());
    }

    #[test]
    fn test_retain_paths() {
        let mut state = StateFile::empty(".fastdl");
        state.set_time_of(Path::new("keep.txt"), 1);
        state.set_time_of(Path::new("gone/old.txt"), 2);
        let seen: HashSet<PathBuf> = [PathBuf::from("keep.txt")].into_iter().collect();
        assert_eq!(state.retain_paths(&seen), 1);
        assert_eq!(state.len(), 1);
        assert_eq!(state.time_of(Path::new("gone/old.txt")), None);
    }

    #[test]
    fn test_state_key() {
        assert_eq!(state_key(Path::new("maps/a.bsp")).as_deref(), Some("maps/a.bsp"));
        assert_eq!(state_key(Path::new("./maps/a.bsp")).as_deref(), Some("maps/a.bsp"));
        assert_eq!(state_key(Path::new("../a.bsp")), None);
        assert_eq!(state_key(Path::new("")), None);
    }
}

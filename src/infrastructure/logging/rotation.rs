//! Log file rotation and backup retention
//!
//! Rotation is size based and runs on the write path:
//! - The active handle is stat'ed before every write
//! - Once it reaches `max_size` it is closed and renamed to
//!   `<file>.<timestamp>` (optionally gzipped to `<file>.<timestamp>.gz`)
//! - Backups beyond `max_backups` are removed, oldest first
//! - A fresh file is opened at the base path
//!
//! The sequence is not atomic on the file system. If the process dies between
//! the rename and the reopen, the next start simply creates the base file.

use chrono::{DateTime, Local};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::error::RotationError;
use crate::domain::models::{BackupFile, RotationPolicy};

/// Size-based rotator bound to one base path
#[derive(Debug, Clone)]
pub struct LogRotator {
    path: PathBuf,
    /// `<file name>.`, the prefix every backup starts with
    backup_prefix: String,
    policy: RotationPolicy,
}

impl LogRotator {
    /// Create a rotator for `path`
    ///
    /// # Arguments
    /// * `path` - Base log file; must name a file
    /// * `policy` - Size threshold, retention count and compression
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        let path = path.into();
        let backup_prefix = path.file_name().map_or_else(
            || ".".to_string(),
            |name| format!("{}.", name.to_string_lossy()),
        );
        Self {
            path,
            backup_prefix,
            policy,
        }
    }

    /// Base log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotation settings
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Rotate `active` if it has reached the size threshold
    ///
    /// Returns the backup path when a rotation happened. When the handle
    /// cannot be stat'ed it is left in place so the caller keeps writing to it.
    pub fn rotate_if_needed(
        &self,
        active: &mut Option<File>,
    ) -> Result<Option<PathBuf>, RotationError> {
        let Some(file) = active.as_ref() else {
            return Ok(None);
        };
        if !self.policy.rotates() {
            return Ok(None);
        }

        let size = file.metadata().map_err(RotationError::Stat)?.len();
        if !self.policy.should_rotate(size) {
            return Ok(None);
        }

        debug!(
            path = %self.path.display(),
            size = size,
            max_size = self.policy.max_size,
            "log file reached rotation threshold"
        );

        self.rotate(active).map(Some)
    }

    /// Rotate unconditionally
    ///
    /// Closes `active`, archives the base file, prunes old backups and stores
    /// a fresh handle back into `active`. The base file is reopened even when
    /// archiving failed, so writes continue.
    pub fn rotate(&self, active: &mut Option<File>) -> Result<PathBuf, RotationError> {
        drop(active.take());

        let archived = self.archive();

        match open_append(&self.path) {
            Ok(file) => *active = Some(file),
            Err(source) => {
                if let Err(error) = &archived {
                    warn!(error = %error, "log archive failed before reopen");
                }
                return Err(RotationError::Reopen {
                    path: self.path.clone(),
                    source,
                });
            }
        }

        archived
    }

    /// Existing backups, newest first
    pub fn backups(&self) -> Result<Vec<BackupFile>, RotationError> {
        let dir = parent_dir(&self.path);
        let entries = fs::read_dir(dir).map_err(|source| RotationError::ListBackups {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(dir = %dir.display(), error = %error, "failed to read directory entry");
                    continue;
                }
            };

            let is_backup = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&self.backup_prefix));
            if !is_backup {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "failed to stat log backup");
                    continue;
                }
            };
            let modified = match metadata.modified() {
                Ok(modified) => DateTime::<Local>::from(modified),
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "failed to read backup modification time");
                    continue;
                }
            };

            backups.push(BackupFile {
                path,
                size: metadata.len(),
                modified,
            });
        }

        // Timestamped names break ties between equal mtimes
        backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
        Ok(backups)
    }

    /// Remove backups beyond `max_backups`
    ///
    /// Failures are reported and skipped so a locked or vanished backup never
    /// blocks rotation.
    ///
    /// # Returns
    /// Number of files deleted
    pub fn cleanup_backups(&self) -> usize {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(error) => {
                warn!(error = %error, "skipping log backup cleanup");
                return 0;
            }
        };

        let mut deleted_count = 0;
        for backup in backups.iter().skip(self.policy.max_backups) {
            match fs::remove_file(&backup.path) {
                Ok(()) => {
                    debug!(path = %backup.path.display(), "deleted expired log backup");
                    deleted_count += 1;
                }
                Err(error) => {
                    warn!(path = %backup.path.display(), error = %error, "failed to delete log backup");
                }
            }
        }

        if deleted_count > 0 {
            info!(
                count = deleted_count,
                max_backups = self.policy.max_backups,
                "cleaned up old log backups"
            );
        }

        deleted_count
    }

    /// Rename, compress and prune. Retention runs even if compression failed.
    fn archive(&self) -> Result<PathBuf, RotationError> {
        let backup = self.backup_path(Local::now());

        fs::rename(&self.path, &backup).map_err(|source| RotationError::Rename {
            from: self.path.clone(),
            to: backup.clone(),
            source,
        })?;

        info!(
            old_path = %self.path.display(),
            new_path = %backup.display(),
            "rotated log file"
        );

        let archived = if self.policy.compress {
            compress_backup(&backup)
        } else {
            Ok(backup)
        };

        self.cleanup_backups();
        archived
    }

    fn backup_path(&self, now: DateTime<Local>) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".");
        name.push(now.format(self.policy.timestamp.pattern()).to_string());
        PathBuf::from(name)
    }
}

/// Open `path` for appending, creating it if needed
pub fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Directory holding `path`; `.` for bare file names
fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Gzip `path` into `<path>.gz`, removing the source only once the archive is
/// fully written and synced.
fn compress_backup(path: &Path) -> Result<PathBuf, RotationError> {
    let mut gz_name = OsString::from(path.as_os_str());
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    if let Err(source) = write_gzip(path, &gz_path) {
        if gz_path.exists() {
            if let Err(error) = fs::remove_file(&gz_path) {
                warn!(path = %gz_path.display(), error = %error, "failed to remove partial archive");
            }
        }
        return Err(RotationError::Compress {
            path: path.to_path_buf(),
            source,
        });
    }

    fs::remove_file(path).map_err(|source| RotationError::RemoveSource {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %gz_path.display(), "compressed log backup");
    Ok(gz_path)
}

fn write_gzip(source: &Path, target: &Path) -> io::Result<()> {
    let mut input = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(File::create(target)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BackupTimestamp;
    use flate2::read::GzDecoder;
    use std::io::{Read, Write};
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_file(path: &Path, len: usize) -> Option<File> {
        let mut file = open_append(path).unwrap();
        file.write_all(&vec![b'x'; len]).unwrap();
        Some(file)
    }

    fn backup_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("app.log."))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_rotate_if_needed_noop_when_small() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 10);

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(1024, 3, false));
        assert!(rotator.rotate_if_needed(&mut active).unwrap().is_none());

        assert!(active.is_some());
        assert!(backup_names(temp_dir.path()).is_empty());
        assert_eq!(fs::metadata(&log_path).unwrap().len(), 10);
    }

    #[test]
    fn test_rotate_if_needed_renames_and_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 2048);

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(1024, 3, false));
        let backup = rotator.rotate_if_needed(&mut active).unwrap().unwrap();

        assert!(active.is_some());
        assert_eq!(fs::metadata(&log_path).unwrap().len(), 0);
        assert_eq!(fs::metadata(&backup).unwrap().len(), 2048);

        let name = backup.file_name().unwrap().to_string_lossy().to_string();
        // app.log.YYYYMMDD_HHMMSS
        assert!(name.starts_with("app.log."));
        assert_eq!(name.len(), "app.log.".len() + 15);
    }

    #[test]
    fn test_zero_max_size_never_rotates() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 4096);

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(0, 3, false));
        assert!(rotator.rotate_if_needed(&mut active).unwrap().is_none());
        assert!(backup_names(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_rotate_if_needed_without_handle_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let rotator = LogRotator::new(&log_path, RotationPolicy::new(1, 3, false));

        let mut active = None;
        assert!(rotator.rotate_if_needed(&mut active).unwrap().is_none());
        assert!(active.is_none());
    }

    #[test]
    fn test_compressed_backup_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let content = b"first line\nsecond line\n".repeat(100);
        let mut file = open_append(&log_path).unwrap();
        file.write_all(&content).unwrap();
        let mut active = Some(file);

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(64, 3, true));
        let backup = rotator.rotate_if_needed(&mut active).unwrap().unwrap();

        assert!(backup.to_string_lossy().ends_with(".gz"));
        let mut decoded = Vec::new();
        GzDecoder::new(File::open(&backup).unwrap())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);

        // Only the archive remains
        assert_eq!(backup_names(temp_dir.path()).len(), 1);
    }

    #[test]
    fn test_compression_failure_keeps_uncompressed_backup() {
        let temp_dir = TempDir::new().unwrap();
        let backup = temp_dir.path().join("x.log.20240101_000000");
        fs::write(&backup, b"rotated content\n").unwrap();

        // A directory squatting on the archive name makes File::create fail
        let gz_path = temp_dir.path().join("x.log.20240101_000000.gz");
        fs::create_dir(&gz_path).unwrap();

        let result = compress_backup(&backup);

        match result {
            Err(RotationError::Compress { path, .. }) => assert_eq!(path, backup),
            other => panic!("expected Compress error, got {other:?}"),
        }
        assert_eq!(fs::read(&backup).unwrap(), b"rotated content\n");
        assert!(!gz_path.is_file(), "no partial archive may remain");
    }

    #[test]
    fn test_rotate_reopens_after_compression_failure() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 128);

        // Block every archive name the next two seconds could produce
        let policy = RotationPolicy::new(64, 3, true).with_timestamp(BackupTimestamp::Seconds);
        let rotator = LogRotator::new(&log_path, policy);
        let now = Local::now();
        for offset in 0..=2 {
            let mut gz_name =
                OsString::from(rotator.backup_path(now + chrono::Duration::seconds(offset)).as_os_str());
            gz_name.push(".gz");
            fs::create_dir(PathBuf::from(gz_name)).unwrap();
        }

        let result = rotator.rotate(&mut active);

        assert!(matches!(result, Err(RotationError::Compress { .. })));
        assert!(active.is_some(), "base file must be reopened");
        assert_eq!(fs::metadata(&log_path).unwrap().len(), 0);
    }

    #[test]
    fn test_retention_keeps_newest_backups() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let policy = RotationPolicy::new(16, 2, false).with_timestamp(BackupTimestamp::Millis);
        let rotator = LogRotator::new(&log_path, policy);

        let mut active = None;
        let mut created = Vec::new();
        for _ in 0..5 {
            drop(active.take());
            active = write_file(&log_path, 32);
            created.push(rotator.rotate_if_needed(&mut active).unwrap().unwrap());
            sleep(Duration::from_millis(15));
        }

        let remaining: Vec<PathBuf> = rotator.backups().unwrap().into_iter().map(|b| b.path).collect();
        assert_eq!(remaining, vec![created[4].clone(), created[3].clone()]);
    }

    #[test]
    fn test_zero_max_backups_deletes_new_backup() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 32);

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(16, 0, true));
        let backup = rotator.rotate_if_needed(&mut active).unwrap().unwrap();

        assert!(!backup.exists());
        assert!(backup_names(temp_dir.path()).is_empty());
        assert!(log_path.exists());
    }

    #[test]
    fn test_cleanup_ignores_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        fs::write(temp_dir.path().join("other.log.20240101_000000"), b"x").unwrap();
        fs::write(temp_dir.path().join("app.txt"), b"x").unwrap();
        fs::write(temp_dir.path().join("app.log.20240101_000000"), b"x").unwrap();
        fs::write(temp_dir.path().join("app.log.20240102_000000.gz"), b"x").unwrap();

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(16, 0, false));
        assert_eq!(rotator.cleanup_backups(), 2);

        assert!(temp_dir.path().join("other.log.20240101_000000").exists());
        assert!(temp_dir.path().join("app.txt").exists());
    }

    #[test]
    fn test_rotate_reopens_when_base_file_vanished() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let mut active = write_file(&log_path, 32);
        fs::remove_file(&log_path).unwrap();

        let rotator = LogRotator::new(&log_path, RotationPolicy::new(16, 3, false));
        let result = rotator.rotate(&mut active);

        assert!(matches!(result, Err(RotationError::Rename { .. })));
        assert!(active.is_some());
        assert!(log_path.exists());
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        assert_eq!(parent_dir(Path::new("app.log")), Path::new("."));
        assert_eq!(parent_dir(Path::new("logs/app.log")), Path::new("logs"));
    }
}

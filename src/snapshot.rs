//! Backup/restore pair for the file under search
//!
//! A [`Snapshot`] copies the target to a sibling `<file>.bak` when it is
//! created and copies it back when it is restored. Restoration happens
//! either through [`Snapshot::restore`] or, if the owner unwinds through an
//! error first, when the snapshot is dropped. The `.bak` file is left on
//! disk.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error_helpers;

const BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug)]
pub struct Snapshot {
    target_path: PathBuf,
    backup_path: PathBuf,
    restored: bool,
}

impl Snapshot {
    /// Back up `target` to `<target>.bak`
    ///
    /// Fails if `target` is not an existing regular file or the copy fails.
    pub fn create(target: &Path) -> Result<Self> {
        if !target.exists() {
            anyhow::bail!(error_helpers::not_found_error(target, "creating backup"));
        }
        if !target.is_file() {
            anyhow::bail!(error_helpers::not_regular_file_error(target, "creating backup"));
        }

        let backup_path = Self::backup_path_for(target);

        fs::copy(target, &backup_path).map_err(|e| {
            anyhow::anyhow!(error_helpers::describe_io_error(
                &backup_path,
                "writing backup",
                &e
            ))
        })?;

        tracing::info!(
            file = %target.display(),
            backup = %backup_path.display(),
            "backup created"
        );

        Ok(Self {
            target_path: target.to_path_buf(),
            backup_path,
            restored: false,
        })
    }

    /// The sibling backup path: the full file name with `.bak` appended
    pub fn backup_path_for(target: &Path) -> PathBuf {
        let mut name: OsString = target.as_os_str().to_owned();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Original content, read from the backup
    pub fn original_content(&self) -> Result<Vec<u8>> {
        fs::read(&self.backup_path)
            .with_context(|| format!("Failed to read backup: {}", self.backup_path.display()))
    }

    /// Copy the backup back over the target
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        self.copy_back()
    }

    fn copy_back(&self) -> Result<()> {
        fs::copy(&self.backup_path, &self.target_path).with_context(|| {
            format!(
                "Failed to restore {} from {}",
                self.target_path.display(),
                self.backup_path.display()
            )
        })?;

        tracing::info!(file = %self.target_path.display(), "target restored from backup");
        Ok(())
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.copy_back() {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            eprintln!(
                "The original content is still in {}",
                self.backup_path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            Snapshot::backup_path_for(Path::new("/tmp/theme.css")),
            PathBuf::from("/tmp/theme.css.bak")
        );
        assert_eq!(
            Snapshot::backup_path_for(Path::new("colors")),
            PathBuf::from("colors.bak")
        );
    }

    #[test]
    fn test_create_copies_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = create_test_file(temp_dir.path(), "style.css", "a { color: #abc; }\n");

        let snapshot = Snapshot::create(&target).unwrap();

        let backup = temp_dir.path().join("style.css.bak");
        assert_eq!(snapshot.backup_path(), backup.as_path());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "a { color: #abc; }\n");
        assert_eq!(
            snapshot.original_content().unwrap(),
            b"a { color: #abc; }\n".to_vec()
        );
        snapshot.restore().unwrap();
    }

    #[test]
    fn test_create_missing_file_fails_without_backup() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("missing.css");

        let err = Snapshot::create(&target).unwrap_err();

        assert!(err.to_string().contains("File not found"));
        assert!(!temp_dir.path().join("missing.css.bak").exists());
    }

    #[test]
    fn test_create_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("css");
        fs::create_dir(&dir).unwrap();

        let err = Snapshot::create(&dir).unwrap_err();

        assert!(err.to_string().contains("Not a regular file"));
        assert!(!err.to_string().contains("File not found"));
        assert!(!temp_dir.path().join("css.bak").exists());
    }

    #[test]
    fn test_restore_overwrites_modified_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = create_test_file(temp_dir.path(), "style.css", "original\n");

        let snapshot = Snapshot::create(&target).unwrap();
        fs::write(&target, "modified\n").unwrap();
        snapshot.restore().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "original\n");
        // The backup stays behind
        assert!(temp_dir.path().join("style.css.bak").exists());
    }

    #[test]
    fn test_drop_restores_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = create_test_file(temp_dir.path(), "style.css", "original\n");

        {
            let _snapshot = Snapshot::create(&target).unwrap();
            fs::write(&target, "modified\n").unwrap();
        }

        assert_eq!(fs::read_to_string(&target).unwrap(), "original\n");
    }

    #[test]
    fn test_restore_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("mixed.css");
        let bytes: Vec<u8> = b"a{color:#fff}\r\n\xff\xfe\nno newline".to_vec();
        fs::write(&target, &bytes).unwrap();

        let snapshot = Snapshot::create(&target).unwrap();
        fs::write(&target, b"garbage").unwrap();
        snapshot.restore().unwrap();

        assert_eq!(fs::read(&target).unwrap(), bytes);
    }
}

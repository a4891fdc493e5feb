//! Scoped removal of temporary files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Removes a path when dropped unless disarmed.
#[derive(Debug)]
pub(crate) struct TempPathGuard {
    path: PathBuf,
    armed: bool,
}

impl TempPathGuard {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file; used once it has been renamed into place.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempPathGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// `<path>.tmp`, appended to the full file name.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Rename `tmp` over `dest`, removing `dest` first if the platform refuses
/// to replace an existing file.
pub(crate) fn replace_file(tmp: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(tmp, dest) {
        Err(_) if dest.exists() => {
            fs::remove_file(dest)?;
            fs::rename(tmp, dest)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.tmp");
        fs::write(&path, b"partial").unwrap();
        {
            let _guard = TempPathGuard::new(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_disarmed_guard_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x");
        fs::write(&path, b"done").unwrap();
        TempPathGuard::new(&path).disarm();
        assert!(path.exists());
    }

    #[test]
    fn test_replace_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("a.tmp");
        let dest = dir.path().join("a");
        fs::write(&dest, b"old").unwrap();
        fs::write(&tmp, b"new").unwrap();
        replace_file(&tmp, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_temp_sibling_appends_suffix() {
        assert_eq!(
            temp_sibling(Path::new("/b/ffmpeg.tar.xz")),
            PathBuf::from("/b/ffmpeg.tar.xz.tmp")
        );
    }
}

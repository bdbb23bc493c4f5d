//! Scoped file access for the orchestrator.
//!
//! Inputs are read whole; outputs are written atomically so a failed call
//! never leaves a partial file behind.

use crate::crypto::rng::fill_random;
use crate::error::{CryptError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Loads the entire file into memory.
///
/// The handle is closed before returning, on success or failure.
pub fn read_all(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(fs::read(path)?))
}

/// Writes `data` to `path` using atomic write.
///
/// This ensures crash-safety by:
/// 1. Writing data to a temporary file with random name next to `path`
/// 2. Syncing the temporary file to disk
/// 3. Atomically replacing the target with the temporary file
/// 4. Syncing the parent directory to ensure the rename is persisted
///
/// On error the temporary file is removed and any existing file at `path`
/// is left as it was. The parent directory must already exist.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = random_tmp_path(path)?;

    // fail if a file with this name already exists
    let tmp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)?;

    if let Err(e) = write_and_sync(tmp_file, data).and_then(|_| atomic_replace(path, &tmp_path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(CryptError::Io(e));
    }

    sync_parent(path)?;
    Ok(())
}

fn write_and_sync(mut file: File, data: &[u8]) -> io::Result<()> {
    file.write_all(data)?;
    file.sync_all()
}

/// Generates a unique temporary file path in the same directory.
///
/// Format: `.filename.tmp.<randomhex>`
fn random_tmp_path(path: &Path) -> Result<PathBuf> {
    let mut buf = [0u8; 8];
    fill_random(&mut buf)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| {
            CryptError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a file path", path.display()),
            ))
        })?
        .to_string_lossy();

    Ok(path.with_file_name(format!(".{}.tmp.{}", file_name, hex::encode(buf))))
}

#[cfg(not(target_os = "windows"))]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

// Directory handles cannot be fsynced on Windows; ReplaceFileW writes through.
#[cfg(target_os = "windows")]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

/// Atomically replaces the target file with the temporary file.
///
/// Uses Windows `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` when the
/// target exists; a plain rename otherwise, since `ReplaceFileW` needs an
/// existing target.
#[cfg(target_os = "windows")]
fn atomic_replace(target: &Path, tmp_path: &Path) -> io::Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    if !target.exists() {
        return fs::rename(tmp_path, target);
    }

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let target_w = to_wide(target.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY:
    // - Strings are valid UTF-16 and null-terminated
    // - Pointers remain valid during the call
    // - Windows does not retain the pointers after return
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// On Unix, `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(target: &Path, tmp_path: &Path) -> io::Result<()> {
    fs::rename(tmp_path, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_returns_written_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        write_atomic(&path, b"hello world").unwrap();

        let data = read_all(&path).unwrap();
        assert_eq!(data.as_slice(), b"hello world");
    }

    #[test]
    fn read_fails_if_file_does_not_exist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        assert!(matches!(read_all(&path), Err(CryptError::Io(_))));
    }

    #[test]
    fn random_tmp_path_has_same_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let tmp = random_tmp_path(&path).unwrap();

        assert_eq!(tmp.parent(), path.parent());
        assert_ne!(tmp, path);
    }

    #[test]
    fn tmp_names_are_unique() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let a = random_tmp_path(&path).unwrap();
        let b = random_tmp_path(&path).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        write_atomic(&path, b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "out.bin");
    }

    #[test]
    fn missing_parent_directory_fails_without_creating_it() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("out.bin");

        assert!(matches!(
            write_atomic(&nested, b"data"),
            Err(CryptError::Io(_))
        ));
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn write_large_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let large = vec![42u8; 100_000];
        write_atomic(&path, &large).unwrap();

        assert_eq!(read_all(&path).unwrap().as_slice(), large.as_slice());
    }
}

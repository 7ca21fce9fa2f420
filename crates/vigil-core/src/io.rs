use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting record files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = staged(path, data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically create `path` with `data` unless it already exists.
///
/// Returns `true` if this call created the file. Two racing writers can both
/// stage a tempfile, but only one link succeeds; the loser sees `false` and
/// the winner's content is left intact.
pub fn create_if_absent(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let tmp = staged(path, data)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

fn staged(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest_prayer.json");
        atomic_write(&path, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache/2025-01-10/everything/q.json");
        atomic_write(&path, b"data").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn atomic_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slot.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn create_if_absent_keeps_first_writer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entry.json");
        assert!(create_if_absent(&path, b"winner").unwrap());
        assert!(!create_if_absent(&path, b"loser").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "winner");
    }

    #[test]
    fn create_if_absent_leaves_no_tempfiles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entry.json");
        create_if_absent(&path, b"a").unwrap();
        create_if_absent(&path, b"b").unwrap();
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn create_if_absent_skips_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, b"original").unwrap();
        let written = create_if_absent(&path, b"new").unwrap();
        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }
}

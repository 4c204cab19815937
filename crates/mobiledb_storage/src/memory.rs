//! In-memory file system for testing.

use crate::error::{StorageError, StorageResult};
use crate::filesystem::{FileSystem, WritableFile};
use crate::path::StoragePath;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type FileData = Arc<RwLock<Vec<u8>>>;

/// An in-memory file system.
///
/// This file system keeps every file in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// It can be switched to read-only to simulate write failures, and it
/// counts how many times files were opened for reading so tests can
/// observe load behaviour.
///
/// # Thread Safety
///
/// This file system is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use mobiledb_storage::{FileSystem, InMemoryFileSystem, StoragePath};
///
/// let path = StoragePath::root().append_file("Note.json").unwrap();
/// let fs = InMemoryFileSystem::new().with_file(path.clone(), b"{}\n".to_vec());
/// assert!(fs.exists(&path).unwrap());
/// assert_eq!(fs.read_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    files: RwLock<BTreeMap<StoragePath, FileData>>,
    read_only: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryFileSystem {
    /// Creates a new empty file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with pre-existing contents.
    ///
    /// Useful for testing load and corruption scenarios.
    #[must_use]
    pub fn with_file(self, path: StoragePath, data: Vec<u8>) -> Self {
        self.files.write().insert(path, Arc::new(RwLock::new(data)));
        self
    }

    /// Returns a copy of the file contents, if the file exists.
    #[must_use]
    pub fn contents(&self, path: &StoragePath) -> Option<Vec<u8>> {
        self.files.read().get(path).map(|data| data.read().clone())
    }

    /// Returns the number of files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Returns how many times a file was opened for reading.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes `create_writable` fail with a permission error while set.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Removes every file.
    pub fn clear(&self) {
        self.files.write().clear();
    }
}

impl FileSystem for InMemoryFileSystem {
    fn exists(&self, path: &StoragePath) -> StorageResult<bool> {
        Ok(self.files.read().contains_key(path))
    }

    fn open_readable(&self, path: &StoragePath) -> StorageResult<Box<dyn Read + Send>> {
        let files = self.files.read();
        let data = files
            .get(path)
            .ok_or_else(|| StorageError::not_found(path.as_str()))?;
        let bytes = data.read().clone();
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn create_writable(&self, path: &StoragePath) -> StorageResult<Box<dyn WritableFile>> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("file system is read-only: cannot create {path}"),
            )));
        }
        if path.is_directory() {
            return Err(StorageError::invalid_path(
                path.as_str(),
                "cannot create a directory as a file",
            ));
        }

        let data = Arc::new(RwLock::new(Vec::new()));
        self.files.write().insert(path.clone(), Arc::clone(&data));
        Ok(Box::new(MemoryWriter { data }))
    }
}

/// Writer that appends straight into the shared file buffer.
struct MemoryWriter {
    data: FileData,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.write().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WritableFile for MemoryWriter {
    fn finish(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(name: &str) -> StoragePath {
        StoragePath::root().append_file(name).unwrap()
    }

    #[test]
    fn memory_new_is_empty() {
        let fs = InMemoryFileSystem::new();
        assert_eq!(fs.file_count(), 0);
        assert!(!fs.exists(&path("a.json")).unwrap());
    }

    #[test]
    fn memory_write_then_read() {
        let fs = InMemoryFileSystem::new();
        let p = path("a.json");

        fs.write_all(&p, b"hello world").unwrap();

        assert!(fs.exists(&p).unwrap());
        assert_eq!(fs.read_all(&p).unwrap(), b"hello world");
        assert_eq!(fs.read_count(), 1);
    }

    #[test]
    fn memory_create_truncates() {
        let p = path("a.json");
        let fs = InMemoryFileSystem::new().with_file(p.clone(), b"old contents".to_vec());

        fs.write_all(&p, b"new").unwrap();
        assert_eq!(fs.contents(&p).unwrap(), b"new");
    }

    #[test]
    fn memory_open_missing_fails() {
        let fs = InMemoryFileSystem::new();
        let result = fs.open_readable(&path("missing.json"));
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert_eq!(fs.read_count(), 0);
    }

    #[test]
    fn memory_read_only_rejects_writes() {
        let p = path("a.json");
        let fs = InMemoryFileSystem::new().with_file(p.clone(), b"keep".to_vec());
        fs.set_read_only(true);

        assert!(matches!(fs.write_all(&p, b"lost"), Err(StorageError::Io(_))));
        assert_eq!(fs.contents(&p).unwrap(), b"keep");

        fs.set_read_only(false);
        fs.write_all(&p, b"written").unwrap();
        assert_eq!(fs.contents(&p).unwrap(), b"written");
    }

    #[test]
    fn memory_readers_see_snapshot() {
        let p = path("a.json");
        let fs = InMemoryFileSystem::new().with_file(p.clone(), b"before".to_vec());

        let mut reader = fs.open_readable(&p).unwrap();
        fs.write_all(&p, b"after").unwrap();

        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"before");
    }

    #[test]
    fn memory_rejects_directory_target() {
        let fs = InMemoryFileSystem::new();
        let dir = StoragePath::root().append_directory("data").unwrap();
        assert!(fs.create_writable(&dir).is_err());
    }

    #[test]
    fn memory_clear() {
        let fs = InMemoryFileSystem::new().with_file(path("a.json"), vec![1]);
        fs.clear();
        assert_eq!(fs.file_count(), 0);
    }
}

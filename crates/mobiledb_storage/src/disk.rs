//! Disk-backed file system for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::filesystem::{FileSystem, WritableFile};
use crate::path::StoragePath;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// A file system rooted at a directory on disk.
///
/// Logical paths are resolved below the root directory; the logical root
/// `/` is the directory itself. Data survives process restarts.
///
/// # Durability
///
/// - [`WritableFile::finish`] flushes the buffered writer to the OS
/// - with `sync_on_finish(true)` (the default) it also calls
///   `File::sync_all()` so the data is on disk
///
/// # Example
///
/// ```no_run
/// use mobiledb_storage::{DiskFileSystem, FileSystem, StoragePath};
///
/// let fs = DiskFileSystem::new("app-data");
/// let path = StoragePath::root().append_file("User.json").unwrap();
/// fs.write_all(&path, b"{}\n").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    root: PathBuf,
    sync_on_finish: bool,
}

impl DiskFileSystem {
    /// Creates a file system rooted at `root`.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sync_on_finish: true,
        }
    }

    /// Sets whether finished writes are synced to disk.
    #[must_use]
    pub const fn sync_on_finish(mut self, value: bool) -> Self {
        self.sync_on_finish = value;
        self
    }

    /// Returns the physical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a logical path to its physical location.
    #[must_use]
    pub fn resolve(&self, path: &StoragePath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl FileSystem for DiskFileSystem {
    fn exists(&self, path: &StoragePath) -> StorageResult<bool> {
        let physical = self.resolve(path);
        Ok(physical.try_exists()? && physical.is_file())
    }

    fn open_readable(&self, path: &StoragePath) -> StorageResult<Box<dyn Read + Send>> {
        match File::open(self.resolve(path)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::not_found(path.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_writable(&self, path: &StoragePath) -> StorageResult<Box<dyn WritableFile>> {
        if path.is_directory() {
            return Err(StorageError::invalid_path(
                path.as_str(),
                "cannot create a directory as a file",
            ));
        }

        let physical = self.resolve(path);
        if let Some(parent) = physical.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&physical)?;

        Ok(Box::new(DiskWriter {
            inner: BufWriter::new(file),
            sync: self.sync_on_finish,
        }))
    }
}

struct DiskWriter {
    inner: BufWriter<File>,
    sync: bool,
}

impl Write for DiskWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl WritableFile for DiskWriter {
    fn finish(self: Box<Self>) -> StorageResult<()> {
        let sync = self.sync;
        let file = self.inner.into_inner().map_err(|e| e.into_error())?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    }
}

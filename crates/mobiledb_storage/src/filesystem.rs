//! File system trait definition.

use crate::error::StorageResult;
use crate::path::StoragePath;
use std::io::{Read, Write};

/// A writable file handle returned by [`FileSystem::create_writable`].
///
/// Bytes written become visible to readers no later than [`finish`]
/// returning successfully. Dropping a handle without calling `finish`
/// leaves the file in an unspecified (possibly truncated) state.
///
/// [`finish`]: WritableFile::finish
pub trait WritableFile: Write + Send {
    /// Flushes buffered bytes and completes the write.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or syncing fails.
    fn finish(self: Box<Self>) -> StorageResult<()>;
}

/// The file-access collaborator used by stores.
///
/// A file system maps [`StoragePath`]s to byte contents. It knows nothing
/// about the line-delimited JSON format stores write.
///
/// # Invariants
///
/// - `exists` returns `true` for a file once `create_writable` succeeded
/// - `open_readable` returns the bytes written by the last finished writer
/// - `create_writable` truncates any existing content
/// - Implementations must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryFileSystem`] - For testing
/// - [`super::DiskFileSystem`] - For persistent storage
pub trait FileSystem: Send + Sync {
    /// Returns `true` if a file exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self, path: &StoragePath) -> StorageResult<bool>;

    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if there is no such file,
    /// or an I/O error.
    fn open_readable(&self, path: &StoragePath) -> StorageResult<Box<dyn Read + Send>>;

    /// Creates (or truncates) the file at `path` and opens it for writing.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn create_writable(&self, path: &StoragePath) -> StorageResult<Box<dyn WritableFile>>;

    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`FileSystem::open_readable`] and the read.
    fn read_all(&self, path: &StoragePath) -> StorageResult<Vec<u8>> {
        let mut reader = self.open_readable(path)?;
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Replaces the file at `path` with `data`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`FileSystem::create_writable`], the write
    /// and [`WritableFile::finish`].
    fn write_all(&self, path: &StoragePath, data: &[u8]) -> StorageResult<()> {
        let mut writer = self.create_writable(path)?;
        writer.write_all(data)?;
        writer.finish()
    }
}

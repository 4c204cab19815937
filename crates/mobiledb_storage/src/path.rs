//! Logical storage paths.

use crate::error::{StorageError, StorageResult};
use std::fmt;

const SEPARATOR: char = '/';

/// A rooted, `/`-separated logical path inside a [`crate::FileSystem`].
///
/// Directory paths end with `/`; file paths do not. The root is `/`.
/// Paths are always absolute and never contain `.` or `..` segments, so a
/// path can be mapped under any physical root without escaping it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// Returns the root directory path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Parses a logical path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if the path is not absolute or
    /// contains an empty, `.` or `..` segment.
    pub fn parse(path: &str) -> StorageResult<Self> {
        if !path.starts_with(SEPARATOR) {
            return Err(StorageError::invalid_path(path, "path must start with '/'"));
        }

        let body = path.trim_start_matches(SEPARATOR);
        let body = body.strip_suffix(SEPARATOR).unwrap_or(body);
        if !body.is_empty() {
            for segment in body.split(SEPARATOR) {
                validate_segment(segment).map_err(|reason| StorageError::invalid_path(path, reason))?;
            }
        }

        // Normalise leading separators to exactly one.
        Ok(Self(format!("{SEPARATOR}{}", path.trim_start_matches(SEPARATOR))))
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns `true` if this path names a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.0.ends_with(SEPARATOR)
    }

    /// Returns `true` if this path names a file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }

    /// Appends a directory segment to a directory path.
    ///
    /// # Errors
    ///
    /// Fails if `self` is a file path or `name` is not a valid segment.
    pub fn append_directory(&self, name: &str) -> StorageResult<Self> {
        self.append(name).map(|mut path| {
            path.0.push(SEPARATOR);
            path
        })
    }

    /// Appends a file name to a directory path.
    ///
    /// # Errors
    ///
    /// Fails if `self` is a file path or `name` is not a valid segment.
    pub fn append_file(&self, name: &str) -> StorageResult<Self> {
        self.append(name)
    }

    fn append(&self, name: &str) -> StorageResult<Self> {
        if !self.is_directory() {
            return Err(StorageError::invalid_path(
                self.0.clone(),
                "cannot append to a file path",
            ));
        }
        validate_segment(name).map_err(|reason| StorageError::invalid_path(name, reason))?;
        Ok(Self(format!("{}{name}", self.0)))
    }

    /// Returns the last segment: the file name, or the directory name
    /// without its trailing separator. `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Returns the containing directory. `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let trimmed = self.0.strip_suffix(SEPARATOR).unwrap_or(&self.0);
        trimmed
            .rfind(SEPARATOR)
            .map(|idx| Self(trimmed[..=idx].to_string()))
    }

    /// Iterates the path segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty path segment");
    }
    if segment == "." || segment == ".." {
        return Err("relative path segments are not allowed");
    }
    if segment.contains(SEPARATOR) {
        return Err("segment contains a separator");
    }
    if segment.contains('\0') || segment.contains('\\') {
        return Err("segment contains a forbidden character");
    }
    Ok(())
}

impl fmt::Debug for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoragePath({})", self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for StoragePath {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_directory() {
        let root = StoragePath::root();
        assert!(root.is_root());
        assert!(root.is_directory());
        assert_eq!(root.name(), None);
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn append_file_to_root() {
        let path = StoragePath::root().append_file("User.json").unwrap();
        assert_eq!(path.as_str(), "/User.json");
        assert!(path.is_file());
        assert_eq!(path.name(), Some("User.json"));
        assert_eq!(path.parent(), Some(StoragePath::root()));
    }

    #[test]
    fn nested_directories() {
        let dir = StoragePath::root()
            .append_directory("data")
            .unwrap()
            .append_directory("v1")
            .unwrap();
        assert_eq!(dir.as_str(), "/data/v1/");
        let file = dir.append_file("Note.json").unwrap();
        assert_eq!(file.segments().collect::<Vec<_>>(), ["data", "v1", "Note.json"]);
        assert_eq!(file.parent(), Some(dir.clone()));
        assert_eq!(dir.name(), Some("v1"));
    }

    #[test]
    fn cannot_append_to_file() {
        let file = StoragePath::root().append_file("a.json").unwrap();
        assert!(matches!(
            file.append_file("b.json"),
            Err(StorageError::InvalidPath { .. })
        ));
    }

    #[test]
    fn rejects_bad_segments() {
        let root = StoragePath::root();
        assert!(root.append_file("").is_err());
        assert!(root.append_file("..").is_err());
        assert!(root.append_file("a/b").is_err());
        assert!(root.append_directory(".").is_err());
    }

    #[test]
    fn parse_valid_and_invalid() {
        assert_eq!(StoragePath::parse("/").unwrap(), StoragePath::root());
        assert_eq!(StoragePath::parse("/a/b.json").unwrap().as_str(), "/a/b.json");
        assert!(StoragePath::parse("/a/").unwrap().is_directory());
        assert!(StoragePath::parse("relative.json").is_err());
        assert!(StoragePath::parse("/a/../b").is_err());
        assert!(StoragePath::parse("/a//b").is_err());
    }
}

//! Store configuration.

use crate::error::CoreResult;
use mobiledb_storage::StoragePath;

/// File extension of store files.
pub const STORE_FILE_EXTENSION: &str = "json";

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Logical directory holding the store files.
    pub root: StoragePath,

    /// File name override. `None` uses `<TypeName>.json`.
    pub file_name: Option<String>,

    /// Whether to load from storage when the store is opened instead of on
    /// first use.
    pub eager_load: bool,

    /// Whether loading checks that each record's persisted identity equals
    /// the key derived from its payload.
    pub verify_identity_on_load: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: StoragePath::root(),
            file_name: None,
            eager_load: false,
            verify_identity_on_load: false,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logical root directory.
    #[must_use]
    pub fn root(mut self, root: StoragePath) -> Self {
        self.root = root;
        self
    }

    /// Overrides the store file name.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets whether to load on open.
    #[must_use]
    pub const fn eager_load(mut self, value: bool) -> Self {
        self.eager_load = value;
        self
    }

    /// Sets whether to verify identities on load.
    #[must_use]
    pub const fn verify_identity_on_load(mut self, value: bool) -> Self {
        self.verify_identity_on_load = value;
        self
    }

    /// Resolves the store file path for an entity type.
    ///
    /// # Errors
    ///
    /// Fails if the root is not a directory or the file name is not a valid
    /// path segment.
    pub fn store_path(&self, type_name: &str) -> CoreResult<StoragePath> {
        let name = match &self.file_name {
            Some(name) => name.clone(),
            None => format!("{type_name}.{STORE_FILE_EXTENSION}"),
        };
        Ok(self.root.append_file(&name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.root.is_root());
        assert!(config.file_name.is_none());
        assert!(!config.eager_load);
        assert!(!config.verify_identity_on_load);
    }

    #[test]
    fn builder_pattern() {
        let root = StoragePath::root().append_directory("stores").unwrap();
        let config = StoreConfig::new()
            .root(root.clone())
            .eager_load(true)
            .verify_identity_on_load(true);

        assert_eq!(config.root, root);
        assert!(config.eager_load);
        assert!(config.verify_identity_on_load);
    }

    #[test]
    fn path_follows_type_name() {
        let path = StoreConfig::default().store_path("User").unwrap();
        assert_eq!(path.as_str(), "/User.json");
    }

    #[test]
    fn file_name_override() {
        let root = StoragePath::root().append_directory("v2").unwrap();
        let config = StoreConfig::new().root(root).file_name("people.jsonl");
        assert_eq!(config.store_path("User").unwrap().as_str(), "/v2/people.jsonl");
    }

    #[test]
    fn invalid_file_name_is_rejected() {
        let config = StoreConfig::new().file_name("../escape.json");
        assert!(config.store_path("User").is_err());
    }
}

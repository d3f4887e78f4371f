//! Loading descriptor files into a registry.
//!
//! Every `*.json` file in a directory is compiled as a
//! [descriptor](crate::descriptor) and registered under its file stem, so
//! `forms/signup.json` becomes the schema `signup`. Files that fail are
//! collected and reported together; the ones that load are registered
//! regardless.
//!
//! Filesystem access goes through the [`FileSystem`] trait so loading can be
//! exercised against an in-memory tree. [`StdEnv`] reads the real disk.
//!
//! # Feature Flag
//!
//! This module is only available when the `loader` feature is enabled.
//!
//! # Example
//!
//! ```rust,no_run
//! use formcheck::loader::StdEnv;
//! use formcheck::SchemaRegistry;
//!
//! let registry = SchemaRegistry::new();
//! registry.load_dir_with_env("./forms", &StdEnv::default())?;
//! # Ok::<(), formcheck::loader::LoadError>(())
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::descriptor::Descriptor;
use crate::error::SchemaBuildError;
use crate::registry::{RegistryError, SchemaRegistry};

/// Environment trait for schema loading.
pub trait SchemaEnv: Send + Sync {
    /// The filesystem implementation type
    type Fs: FileSystem;

    /// Returns a reference to the filesystem
    fn filesystem(&self) -> &Self::Fs;
}

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// The error type for filesystem operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the contents of a file as a string.
    fn read_file(&self, path: &Path) -> Result<String, Self::Error>;

    /// Lists all entries in a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Self::Error>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type Error = std::io::Error;

    fn read_file(&self, path: &Path) -> Result<String, Self::Error> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Self::Error> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        Ok(entries)
    }
}

/// An environment backed by [`StdFileSystem`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv {
    fs: StdFileSystem,
}

impl SchemaEnv for StdEnv {
    type Fs = StdFileSystem;

    fn filesystem(&self) -> &Self::Fs {
        &self.fs
    }
}

/// Errors that can occur while loading descriptor files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error reading a file or directory
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, Box<dyn std::error::Error + Send + Sync>),

    /// The file is not a well-formed descriptor
    #[error("Parse error in {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    /// The descriptor describes an inconsistent schema
    #[error("Schema error in {0}: {1}")]
    Build(PathBuf, SchemaBuildError),

    /// The file stem is not valid UTF-8
    #[error("Invalid filename: {0}")]
    InvalidFileName(PathBuf),

    #[error("Registry error: {0}")]
    Registry(RegistryError),

    /// Several files failed
    #[error("{} files failed to load", .0.len())]
    Multiple(Vec<LoadError>),
}

impl SchemaRegistry {
    /// Loads every descriptor file from a directory.
    ///
    /// Files without a `.json` extension are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Io` if the directory cannot be listed, and
    /// `LoadError::Multiple` with one entry per failed file otherwise.
    pub fn load_dir_with_env<E: SchemaEnv>(
        &self,
        path: impl AsRef<Path>,
        env: &E,
    ) -> Result<(), LoadError> {
        let path = path.as_ref();
        let fs = env.filesystem();
        let files = fs
            .read_dir(path)
            .map_err(|e| LoadError::Io(path.to_path_buf(), Box::new(e)))?;

        let mut errors = Vec::new();
        let mut loaded = 0usize;

        for file in files {
            if file.extension().and_then(|s| s.to_str()) != Some("json") {
                warn!(file = %file.display(), "skipping non-descriptor file");
                continue;
            }
            match self.load_descriptor_file(&file, fs) {
                Ok(()) => loaded += 1,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "failed to load descriptor");
                    errors.push(e);
                }
            }
        }

        debug!(dir = %path.display(), loaded, failed = errors.len(), "descriptor directory loaded");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoadError::Multiple(errors))
        }
    }

    fn load_descriptor_file<Fs: FileSystem>(&self, path: &Path, fs: &Fs) -> Result<(), LoadError> {
        let content = fs
            .read_file(path)
            .map_err(|e| LoadError::Io(path.to_path_buf(), Box::new(e)))?;

        let descriptor: Descriptor = serde_json::from_str(&content)
            .map_err(|e| LoadError::Parse(path.to_path_buf(), e))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoadError::InvalidFileName(path.to_path_buf()))?;

        let schema = descriptor
            .compile()
            .map_err(|e| LoadError::Build(path.to_path_buf(), e))?;

        self.register_dyn(name, schema).map_err(LoadError::Registry)
    }
}

//! Virtual File System used by the expander.
//!
//! Documents, their nested includes and the expanded outputs all go
//! through this trait, so the pipeline can run against real files or an
//! in-memory tree in tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Error type for VFS operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// File not found.
    NotFound(String),
    /// Read error.
    ReadError(String),
    /// Write error.
    WriteError(String),
    /// Permission denied.
    PermissionDenied(String),
}

impl std::fmt::Display for VfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VfsError::NotFound(path) => write!(f, "file not found: {}", path),
            VfsError::ReadError(msg) => write!(f, "read error: {}", msg),
            VfsError::WriteError(msg) => write!(f, "write error: {}", msg),
            VfsError::PermissionDenied(path) => write!(f, "permission denied: {}", path),
        }
    }
}

impl std::error::Error for VfsError {}

/// Virtual File System trait.
pub trait VirtualFileSystem: Send + Sync {
    /// Read a file as text.
    fn read_text(&self, path: &str) -> VfsResult<String>;

    /// Create or replace a text file.
    fn write_text(&self, path: &str, content: &str) -> VfsResult<()>;

    /// Check if a file exists.
    fn exists(&self, path: &str) -> bool;
}

/// An in-memory VFS for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryVfs {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryVfs {
    /// Create a new empty memory VFS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file to the VFS.
    pub fn add_text_file(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files_mut().insert(path.into(), content.into());
    }

    /// Builder-style variant of [`MemoryVfs::add_text_file`].
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.add_text_file(path, content);
        self
    }

    /// Paths currently stored, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files().keys().cloned().collect();
        paths.sort();
        paths
    }

    // Every write is a single insert, so a poisoned map is still consistent.
    fn files(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VirtualFileSystem for MemoryVfs {
    fn read_text(&self, path: &str) -> VfsResult<String> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn write_text(&self, path: &str, content: &str) -> VfsResult<()> {
        self.files_mut().insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.files().contains_key(path)
    }
}

/// A real file system VFS.
pub struct RealVfs {
    root: PathBuf,
}

impl RealVfs {
    /// Create a new real VFS rooted at the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        }
    }
}

fn map_io_error(path: &str, e: std::io::Error, other: fn(String) -> VfsError) -> VfsError {
    match e.kind() {
        std::io::ErrorKind::NotFound => VfsError::NotFound(path.to_string()),
        std::io::ErrorKind::PermissionDenied => VfsError::PermissionDenied(path.to_string()),
        _ => other(format!("{}: {}", path, e)),
    }
}

impl VirtualFileSystem for RealVfs {
    fn read_text(&self, path: &str) -> VfsResult<String> {
        std::fs::read_to_string(self.resolve_path(path))
            .map_err(|e| map_io_error(path, e, VfsError::ReadError))
    }

    fn write_text(&self, path: &str, content: &str) -> VfsResult<()> {
        std::fs::write(self.resolve_path(path), content)
            .map_err(|e| map_io_error(path, e, VfsError::WriteError))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve_path(path).exists()
    }
}

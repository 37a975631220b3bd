//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and diagnostic records
//! - The virtual file system documents are read from and written to

pub mod error;
pub mod vfs;

// Re-export commonly used items
pub use error::{
    Diagnostic, DiagnosticKind, DiagnosticSeverity, ExpandError, ExpandResult,
};
pub use vfs::{MemoryVfs, RealVfs, VfsError, VfsResult, VirtualFileSystem};

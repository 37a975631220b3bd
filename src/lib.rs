//! # Plecta
//!
//! Script-driven macro expansion for LaTeX sources.
//!
//! A `.txs` document is LaTeX with embedded script: declaration regions
//! that set things up and `__expression__` blocks whose values are spliced
//! into the text. Expanding it yields a plain `.tex` document.
//!
//! ## Features
//!
//! - **Declarations**: `\n___ ... ___` regions run once per document and
//!   remain in the output as comments
//! - **Expressions**: `__ ... __` blocks are replaced by their value
//! - **Recursive includes**: `\input{part.txs}` is expanded first and its
//!   declarations become visible to the including document
//! - **Diagnostics**: line-numbered warnings and errors, as data
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use plecta::{ExpandConfig, Expander, MemoryVfs, VirtualFileSystem};
//!
//! let vfs = Arc::new(MemoryVfs::new().with_file("doc.txs", "Sum: __[1, 2, 3].reduce((a, b) => a + b)__"));
//! let expander = Expander::new(vfs.clone(), ExpandConfig::default());
//! let output = expander.expand_file("doc.txs").unwrap();
//!
//! assert_eq!(output.content, "Sum: 6");
//! assert!(vfs.exists("doc.tex"));
//! ```

pub mod core;
pub mod utils;

pub use crate::core::expand::{
    expand_str, expand_str_with, CommentStyle, DocumentOutput, EvaluationStrategy, Evaluator,
    ExpandConfig, Expander,
};
pub use crate::core::script::{EvalConfig, Interpreter, Value};
pub use utils::error::{Diagnostic, DiagnosticKind, DiagnosticSeverity, ExpandError, ExpandResult};
pub use utils::vfs::{MemoryVfs, RealVfs, VfsError, VirtualFileSystem};

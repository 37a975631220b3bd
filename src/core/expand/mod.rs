//! Macro expansion of `.txs` documents
//!
//! A macro-source document is ordinary LaTeX with two kinds of embedded
//! script:
//!
//! - declaration regions, opened by `___` at the start of a line and
//!   closed by the next `___`, run once for their side effects and are
//!   left in the output as `%` comments;
//! - expression blocks, `__expr__` on a single line, replaced by the
//!   value of the expression.
//!
//! # Example
//!
//! ```
//! let tex = plecta::expand_str("\n___const x = 2;___\nValue: __x*2__\n").unwrap();
//! assert_eq!(tex, "\n% const x = 2;\nValue: 4\n");
//! ```

pub mod config;
pub mod document;
pub mod evaluate;
pub mod extract;
pub mod include;
pub mod placeholder;
pub mod substitute;

use std::sync::Arc;

use crate::utils::error::ExpandResult;
use crate::utils::vfs::MemoryVfs;

pub use config::{CommentStyle, EvaluationStrategy, ExpandConfig, EXPANSION_RECURSION_DEPTH};
pub use document::{DeclarationBlock, DocumentOutput, EvaluatorFactory, Expander};
pub use evaluate::{DeclarationFailure, Evaluations, Evaluator};
pub use extract::{extract, ExpressionSlot, ExtractedDocument};
pub use include::{find_includes, rewrite_includes, IncludeDirective};
pub use placeholder::{min_index, placeholder, PlaceholderAllocator, PLACEHOLDER_PREFIX};
pub use substitute::{substitute, Substitution};

/// Expand a standalone document with default options. Warnings are
/// dropped; use [`Expander`] to see them.
pub fn expand_str(source: &str) -> ExpandResult<String> {
    expand_str_with(source, ExpandConfig::default())
}

/// Expand a standalone document with custom options.
pub fn expand_str_with(source: &str, config: ExpandConfig) -> ExpandResult<String> {
    let expander = Expander::new(Arc::new(MemoryVfs::new()), config);
    expander
        .expand_source("<input>", source)
        .map(|output| output.content)
}

//! Expansion options
//!
//! Everything that varies between runs of the pipeline: recursion,
//! evaluation strategy, file naming and how declaration regions are
//! neutralised in the output format.

use std::fmt;
use std::str::FromStr;

use crate::core::script::EvalConfig;

// =============================================================================
// Evaluation Strategy
// =============================================================================

/// How expression blocks are evaluated relative to substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationStrategy {
    /// Evaluate each expression immediately before its placeholder is
    /// substituted.
    #[default]
    Lazy,
    /// Evaluate every expression up front, then substitute.
    Eager,
}

impl EvaluationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStrategy::Lazy => "lazy",
            EvaluationStrategy::Eager => "eager",
        }
    }
}

impl fmt::Display for EvaluationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lazy" => Ok(EvaluationStrategy::Lazy),
            "eager" => Ok(EvaluationStrategy::Eager),
            other => Err(format!(
                "unknown evaluation strategy '{}' (expected 'lazy' or 'eager')",
                other
            )),
        }
    }
}

// =============================================================================
// Comment Style
// =============================================================================

/// How a declaration region is turned into inert commentary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentStyle {
    /// Prefix every line of the block (`% ` for LaTeX).
    Line { prefix: String },
    /// Wrap the whole block (`<!-- ... -->` and the like).
    Wrap { open: String, close: String },
}

impl Default for CommentStyle {
    fn default() -> Self {
        CommentStyle::latex()
    }
}

impl CommentStyle {
    pub fn latex() -> Self {
        CommentStyle::Line {
            prefix: "% ".to_string(),
        }
    }

    pub fn line(prefix: impl Into<String>) -> Self {
        CommentStyle::Line {
            prefix: prefix.into(),
        }
    }

    pub fn wrap(open: impl Into<String>, close: impl Into<String>) -> Self {
        CommentStyle::Wrap {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Comment out the interior of a declaration region.
    pub fn comment_out(&self, body: &str) -> String {
        match self {
            CommentStyle::Line { prefix } => {
                let mut out = String::with_capacity(body.len() + prefix.len());
                out.push_str(prefix);
                out.push_str(&body.replace('\n', &format!("\n{}", prefix)));
                out
            }
            CommentStyle::Wrap { open, close } => format!("{}{}{}", open, body, close),
        }
    }
}

// =============================================================================
// Expand Configuration
// =============================================================================

/// Options for document expansion
#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Expand included macro-source documents before the including one
    /// Default: false
    pub recursive: bool,

    /// Default: lazy
    pub strategy: EvaluationStrategy,

    /// Extension of macro-source documents, without the dot
    /// Default: "txs"
    pub source_extension: String,

    /// Extension of expanded documents, without the dot
    /// Default: "tex"
    pub output_extension: String,

    /// Default: `% ` line comments
    pub comment_style: CommentStyle,

    /// Commands treated as include directives (`\input{...}`)
    /// Default: input, include
    pub include_commands: Vec<String>,

    /// Deepest allowed include chain, counting the root document
    /// Default: 12
    pub max_include_depth: usize,

    /// Limits for the script engine
    /// Default: [`EvalConfig::default`] with a call depth of
    /// [`EXPANSION_RECURSION_DEPTH`]
    pub eval: EvalConfig,
}

/// Script call depth allowed while expanding. Documents are expanded on a
/// thread whose stack is sized for it.
pub const EXPANSION_RECURSION_DEPTH: usize = 1_000;

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            strategy: EvaluationStrategy::Lazy,
            source_extension: "txs".to_string(),
            output_extension: "tex".to_string(),
            comment_style: CommentStyle::latex(),
            include_commands: vec!["input".to_string(), "include".to_string()],
            max_include_depth: 12,
            eval: EvalConfig::default().with_max_recursion_depth(EXPANSION_RECURSION_DEPTH),
        }
    }
}

impl ExpandConfig {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options that expand included documents
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_strategy(mut self, strategy: EvaluationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_comment_style(mut self, style: CommentStyle) -> Self {
        self.comment_style = style;
        self
    }

    pub fn with_extensions(mut self, source: impl Into<String>, output: impl Into<String>) -> Self {
        self.source_extension = source.into();
        self.output_extension = output.into();
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Whether `path` names a macro-source document.
    pub fn is_source_path(&self, path: &str) -> bool {
        path.rsplit_once('.')
            .map(|(stem, ext)| !stem.is_empty() && !stem.ends_with('/') && ext == self.source_extension)
            .unwrap_or(false)
    }

    /// Sibling output path for a macro-source path (`a/b.txs` -> `a/b.tex`).
    /// Other paths get the output extension appended.
    pub fn output_path(&self, path: &str) -> String {
        match path.strip_suffix(&format!(".{}", self.source_extension)) {
            Some(stem) if self.is_source_path(path) => {
                format!("{}.{}", stem, self.output_extension)
            }
            _ => format!("{}.{}", path, self.output_extension),
        }
    }

    /// Whether `command` (without the backslash) is an include directive.
    pub fn is_include_command(&self, command: &str) -> bool {
        self.include_commands.iter().any(|c| c == command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_comment_out() {
        let style = CommentStyle::latex();
        assert_eq!(style.comment_out("const x = 2;"), "% const x = 2;");
        assert_eq!(
            style.comment_out("const a = 1;\nconst b = 2;"),
            "% const a = 1;\n% const b = 2;"
        );
    }

    #[test]
    fn test_wrap_comment_out() {
        let style = CommentStyle::wrap("<!--", "-->");
        assert_eq!(style.comment_out("let y = 1;\n"), "<!--let y = 1;\n-->");
    }

    #[test]
    fn test_output_path() {
        let config = ExpandConfig::default();
        assert_eq!(config.output_path("doc.txs"), "doc.tex");
        assert_eq!(config.output_path("parts/intro.txs"), "parts/intro.tex");
        assert_eq!(config.output_path("notes"), "notes.tex");
    }

    #[test]
    fn test_is_source_path() {
        let config = ExpandConfig::default();
        assert!(config.is_source_path("a.txs"));
        assert!(config.is_source_path("dir/a.txs"));
        assert!(!config.is_source_path("a.tex"));
        assert!(!config.is_source_path(".txs"));
        assert!(!config.is_source_path("dir/.txs"));
        assert!(!config.is_source_path("txs"));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lazy".parse::<EvaluationStrategy>(), Ok(EvaluationStrategy::Lazy));
        assert_eq!("EAGER".parse::<EvaluationStrategy>(), Ok(EvaluationStrategy::Eager));
        assert!("batch".parse::<EvaluationStrategy>().is_err());
    }

    #[test]
    fn test_recursive_constructor() {
        let config = ExpandConfig::recursive().with_strategy(EvaluationStrategy::Eager);
        assert!(config.recursive);
        assert_eq!(config.strategy, EvaluationStrategy::Eager);
        assert_eq!(config.max_include_depth, 12);
        assert_eq!(config.eval.max_recursion_depth, EXPANSION_RECURSION_DEPTH);
        assert!(config.is_include_command("input"));
        assert!(!config.is_include_command("usepackage"));
    }
}

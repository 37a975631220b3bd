//! Error handling for document expansion
//!
//! This module provides the fatal error type of the expansion pipeline and
//! the diagnostic records (warnings and errors) reported per document.

use std::fmt;

use serde::Serialize;

use super::vfs::VfsError;

/// Fatal expansion error. Aborts the document it was raised for; sibling
/// root documents are unaffected.
#[derive(Debug, Clone)]
pub enum ExpandError {
    /// The declaration program failed to parse or execute
    Declaration {
        file: String,
        block_source: String,
        message: String,
    },
    /// One expression block failed to evaluate
    Expression {
        file: String,
        block_source: String,
        /// 1-based line of the block's placeholder in the pre-substitution text
        line: usize,
        message: String,
    },
    /// A nested document failed during recursive expansion
    Include {
        file: String,
        included: String,
        source: Box<ExpandError>,
    },
    /// A document includes itself, directly or transitively
    IncludeCycle { file: String, chain: Vec<String> },
    /// Includes nest deeper than the configured limit
    IncludeDepth {
        file: String,
        chain: Vec<String>,
        max_depth: usize,
    },
    /// Reading the document or writing its output failed
    Io { file: String, source: VfsError },
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::Declaration {
                file,
                block_source,
                message,
            } => write!(
                f,
                "{}: declaration block `{}` failed: {}",
                file,
                abbreviate(block_source),
                message
            ),
            ExpandError::Expression {
                file,
                block_source,
                line,
                message,
            } => write!(
                f,
                "{}:{}: expression __{}__ failed: {}",
                file, line, block_source, message
            ),
            ExpandError::Include {
                file,
                included,
                source,
            } => write!(f, "{}: included document {} failed: {}", file, included, source),
            ExpandError::IncludeCycle { file, chain } => {
                write!(f, "{}: include cycle: {}", file, chain.join(" -> "))
            }
            ExpandError::IncludeDepth {
                file,
                chain,
                max_depth,
            } => write!(
                f,
                "{}: includes nested deeper than {}: {}",
                file,
                max_depth,
                chain.join(" -> ")
            ),
            ExpandError::Io { file, source } => write!(f, "{}: {}", file, source),
        }
    }
}

impl std::error::Error for ExpandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExpandError::Include { source, .. } => Some(source.as_ref()),
            ExpandError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for expansion operations
pub type ExpandResult<T> = Result<T, ExpandError>;

/// First line of a block, shortened for one-line messages.
fn abbreviate(source: &str) -> String {
    let first = source.trim().lines().next().unwrap_or_default();
    let multiline = source.trim().lines().nth(1).is_some();
    if first.chars().count() > 60 {
        let cut: String = first.chars().take(57).collect();
        format!("{}...", cut)
    } else if multiline {
        format!("{} ...", first)
    } else {
        first.to_string()
    }
}

// Convenience constructors and accessors
impl ExpandError {
    pub fn declaration(
        file: impl Into<String>,
        block_source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ExpandError::Declaration {
            file: file.into(),
            block_source: block_source.into(),
            message: message.into(),
        }
    }

    pub fn expression(
        file: impl Into<String>,
        block_source: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        ExpandError::Expression {
            file: file.into(),
            block_source: block_source.into(),
            line,
            message: message.into(),
        }
    }

    pub fn include(file: impl Into<String>, included: impl Into<String>, source: ExpandError) -> Self {
        ExpandError::Include {
            file: file.into(),
            included: included.into(),
            source: Box::new(source),
        }
    }

    pub fn io(file: impl Into<String>, source: VfsError) -> Self {
        ExpandError::Io {
            file: file.into(),
            source,
        }
    }

    /// The document this error aborted.
    pub fn file_name(&self) -> &str {
        match self {
            ExpandError::Declaration { file, .. }
            | ExpandError::Expression { file, .. }
            | ExpandError::Include { file, .. }
            | ExpandError::IncludeCycle { file, .. }
            | ExpandError::IncludeDepth { file, .. }
            | ExpandError::Io { file, .. } => file,
        }
    }

    /// The innermost error, following nested include failures.
    pub fn root_cause(&self) -> &ExpandError {
        match self {
            ExpandError::Include { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Source of the failing block, if a block failed.
    pub fn block_source(&self) -> Option<&str> {
        match self.root_cause() {
            ExpandError::Declaration { block_source, .. }
            | ExpandError::Expression { block_source, .. } => Some(block_source),
            _ => None,
        }
    }

    /// Line of the failing expression block, in the file that contains it.
    pub fn line(&self) -> Option<usize> {
        match self.root_cause() {
            ExpandError::Expression { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The underlying message without file or block context.
    pub fn message(&self) -> String {
        match self {
            ExpandError::Declaration { message, .. } | ExpandError::Expression { message, .. } => {
                message.clone()
            }
            ExpandError::Include { included, source, .. } => {
                format!("in {}: {}", included, source.message())
            }
            ExpandError::IncludeCycle { chain, .. } => {
                format!("include cycle: {}", chain.join(" -> "))
            }
            ExpandError::IncludeDepth {
                chain, max_depth, ..
            } => format!(
                "includes nested deeper than {}: {}",
                max_depth,
                chain.join(" -> ")
            ),
            ExpandError::Io { source, .. } => source.to_string(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ExpandError::Declaration { .. } => DiagnosticKind::DeclarationFailed,
            ExpandError::Expression { .. } => DiagnosticKind::ExpressionFailed,
            ExpandError::Include { .. }
            | ExpandError::IncludeCycle { .. }
            | ExpandError::IncludeDepth { .. } => DiagnosticKind::IncludeFailed,
            ExpandError::Io { .. } => DiagnosticKind::Io,
        }
    }

    /// The fatal record reported for the aborted document.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut message = self.message();
        if let Some(block) = self.block_source() {
            message = format!("{} (in `{}`)", message, abbreviate(block));
        }
        Diagnostic {
            severity: DiagnosticSeverity::Error,
            kind: self.kind(),
            file: self.file_name().to_string(),
            message,
            line: self.line(),
        }
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Severity level for diagnostics (determines coloring and exit status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    /// The document was not produced (red)
    Error,
    /// Output was produced but may be wrong (yellow)
    Warning,
    /// Informational (cyan)
    Info,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An expression evaluated to neither a number nor a string
    NonScalarValue,
    /// A non-recursive run met an include of a macro-source document
    UnexpectedInclude,
    DeclarationFailed,
    ExpressionFailed,
    IncludeFailed,
    Io,
    /// A command line argument was not a macro-source document
    SkippedInput,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::NonScalarValue => "non-scalar value",
            DiagnosticKind::UnexpectedInclude => "unexpanded include",
            DiagnosticKind::DeclarationFailed => "declaration error",
            DiagnosticKind::ExpressionFailed => "expression error",
            DiagnosticKind::IncludeFailed => "include error",
            DiagnosticKind::Io => "io error",
            DiagnosticKind::SkippedInput => "skipped",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic record, emitted as data rather than printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub kind: DiagnosticKind,
    /// Document the diagnostic belongs to
    pub file: String,
    pub message: String,
    /// 1-based line, when the diagnostic points into the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            kind,
            file: file.into(),
            message: message.into(),
            line: None,
        }
    }

    pub fn info(kind: DiagnosticKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Info,
            ..Self::warning(kind, file, message)
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// Get ANSI color code for this diagnostic's severity.
    pub fn color_code(&self) -> &'static str {
        match self.severity {
            DiagnosticSeverity::Error => "\x1b[31m",   // red
            DiagnosticSeverity::Warning => "\x1b[33m", // yellow
            DiagnosticSeverity::Info => "\x1b[36m",    // cyan
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: [{}] {}", self.file, line, self.kind, self.message),
            None => write!(f, "{}: [{}] {}", self.file, self.kind, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_error_display() {
        let err = ExpandError::expression("main.txs", "x.y", 3, "undefined variable: x");
        let msg = err.to_string();
        assert!(msg.contains("main.txs:3"));
        assert!(msg.contains("__x.y__"));
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.block_source(), Some("x.y"));
    }

    #[test]
    fn test_include_error_reports_nested_block() {
        let inner = ExpandError::declaration("part.txs", "const = 1", "syntax error");
        let err = ExpandError::include("main.txs", "part.txs", inner);

        assert_eq!(err.file_name(), "main.txs");
        assert_eq!(err.block_source(), Some("const = 1"));
        assert_eq!(err.line(), None);
        assert_eq!(err.message(), "in part.txs: syntax error");
        assert_eq!(err.root_cause().file_name(), "part.txs");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_to_diagnostic() {
        let err = ExpandError::expression("a.txs", "1/", 7, "unexpected end of input");
        let diag = err.to_diagnostic();
        assert!(diag.is_error());
        assert_eq!(diag.kind, DiagnosticKind::ExpressionFailed);
        assert_eq!(diag.line, Some(7));
        assert_eq!(diag.color_code(), "\x1b[31m");
        assert!(diag.to_string().starts_with("a.txs:7: [expression error]"));
    }

    #[test]
    fn test_diagnostic_json() {
        let diag = Diagnostic::warning(DiagnosticKind::NonScalarValue, "a.txs", "array").with_line(2);
        let json = serde_json::to_string(&diag).unwrap();
        assert_eq!(
            json,
            r#"{"severity":"warning","kind":"non_scalar_value","file":"a.txs","message":"array","line":2}"#
        );

        let info = Diagnostic::info(DiagnosticKind::SkippedInput, "notes.md", "skipped");
        assert!(!serde_json::to_string(&info).unwrap().contains("line"));
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("  const x = 1;  "), "const x = 1;");
        assert_eq!(abbreviate("const a = 1;\nconst b = 2;"), "const a = 1; ...");
        assert_eq!(abbreviate(&"x".repeat(80)).len(), 60);
    }
}

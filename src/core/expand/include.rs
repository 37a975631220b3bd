//! Include directives
//!
//! Finds `\input{...}`-style directives that point at other macro-source
//! documents and rewrites them to point at the expanded siblings.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::config::ExpandConfig;

lazy_static! {
    static ref INCLUDE_RE: Regex = Regex::new(r"\\([A-Za-z]+)\{([^}\n]+)\}").unwrap();
}

/// An include directive referencing a macro-source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Command name without the backslash
    pub command: String,
    /// Referenced path, as written
    pub path: String,
    /// Byte range of the path inside the braces
    pub path_range: Range<usize>,
    /// 1-based line of the directive
    pub line: usize,
}

/// Find include directives whose target has the macro-source extension.
/// Directives for any other file are left alone.
pub fn find_includes(text: &str, config: &ExpandConfig) -> Vec<IncludeDirective> {
    let mut line = 1;
    let mut scanned = 0;
    let mut found = Vec::new();

    for caps in INCLUDE_RE.captures_iter(text) {
        let (Some(command), Some(path)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if !config.is_include_command(command.as_str()) || !config.is_source_path(path.as_str()) {
            continue;
        }
        line += text[scanned..command.start()].matches('\n').count();
        scanned = command.start();

        found.push(IncludeDirective {
            command: command.as_str().to_string(),
            path: path.as_str().to_string(),
            path_range: path.range(),
            line,
        });
    }
    found
}

/// Point every directive at its expanded sibling (`.txs` -> `.tex`).
pub fn rewrite_includes(text: &str, directives: &[IncludeDirective], config: &ExpandConfig) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for directive in directives {
        out.push_str(&text[last..directive.path_range.start]);
        out.push_str(&config.output_path(&directive.path));
        last = directive.path_range.end;
    }
    out.push_str(&text[last..]);
    out
}

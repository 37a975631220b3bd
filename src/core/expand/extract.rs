//! Block extraction
//!
//! Pulls declaration regions (`\n___ ... ___`) and expression blocks
//! (`__ ... __`) out of a document. Declarations are replaced in place by
//! their commented-out source; expressions by freshly allocated
//! placeholder tokens.

use lazy_static::lazy_static;
use regex::Regex;

use super::config::CommentStyle;
use super::placeholder::{placeholder, PlaceholderAllocator};

lazy_static! {
    /// A declaration region opens with `___` at the start of a line.
    static ref DECLARATION_RE: Regex = Regex::new(r"(?s)(?:\A|\n)___(.+?)___").unwrap();
    /// An expression block never spans a line break.
    static ref EXPRESSION_RE: Regex = Regex::new(r"__([^\n]*?)__").unwrap();
}

/// One expression block and where its placeholder sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionSlot {
    /// Script source between the `__` markers
    pub source: String,
    /// Placeholder index
    pub index: usize,
    /// Byte offset of the placeholder in [`ExtractedDocument::text`]
    pub offset: usize,
    /// 1-based line of the placeholder in [`ExtractedDocument::text`]
    pub line: usize,
}

impl ExpressionSlot {
    pub fn token(&self) -> String {
        placeholder(self.index)
    }
}

/// A document with its blocks pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Text with declarations commented out and expressions replaced by
    /// placeholders
    pub text: String,
    /// Declaration sources in document order
    pub declarations: Vec<String>,
    /// Expression blocks in document order
    pub expressions: Vec<ExpressionSlot>,
    /// First generated placeholder index
    pub min_index: usize,
}

/// Run both extraction passes over `text`.
///
/// The allocator must have been built from the raw document before any
/// rewriting. Text inside a declaration region is not scanned for
/// expressions.
pub fn extract(
    text: &str,
    allocator: &mut PlaceholderAllocator,
    style: &CommentStyle,
) -> ExtractedDocument {
    let mut out = String::with_capacity(text.len());
    let mut declarations = Vec::new();
    let mut expressions = Vec::new();
    let mut last = 0;

    for caps in DECLARATION_RE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        extract_expressions(&text[last..whole.start()], allocator, &mut out, &mut expressions);

        if whole.as_str().starts_with('\n') {
            out.push('\n');
        }
        out.push_str(&style.comment_out(body.as_str()));
        declarations.push(body.as_str().to_string());
        last = whole.end();
    }
    extract_expressions(&text[last..], allocator, &mut out, &mut expressions);

    assign_lines(&out, &mut expressions);

    ExtractedDocument {
        text: out,
        declarations,
        expressions,
        min_index: allocator.min_index(),
    }
}

fn extract_expressions(
    segment: &str,
    allocator: &mut PlaceholderAllocator,
    out: &mut String,
    expressions: &mut Vec<ExpressionSlot>,
) {
    let mut last = 0;
    for caps in EXPRESSION_RE.captures_iter(segment) {
        let (Some(whole), Some(source)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&segment[last..whole.start()]);

        let index = allocator.allocate();
        expressions.push(ExpressionSlot {
            source: source.as_str().to_string(),
            index,
            offset: out.len(),
            line: 0,
        });
        out.push_str(&placeholder(index));
        last = whole.end();
    }
    out.push_str(&segment[last..]);
}

/// Fill in 1-based line numbers. Slots are sorted by offset.
fn assign_lines(text: &str, slots: &mut [ExpressionSlot]) {
    let mut line = 1;
    let mut scanned = 0;
    for slot in slots {
        line += text[scanned..slot.offset].matches('\n').count();
        scanned = slot.offset;
        slot.line = line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> ExtractedDocument {
        let mut alloc = PlaceholderAllocator::scan(text);
        extract(text, &mut alloc, &CommentStyle::latex())
    }

    fn sources(doc: &ExtractedDocument) -> Vec<&str> {
        doc.expressions.iter().map(|s| s.source.as_str()).collect()
    }

    #[test]
    fn test_declaration_and_expression() {
        let doc = run("\n___const x = 2;___\nValue: __x*2__\n");
        assert_eq!(doc.text, "\n% const x = 2;\nValue: TOKEN_0\n");
        assert_eq!(doc.declarations, vec!["const x = 2;".to_string()]);
        assert_eq!(sources(&doc), vec!["x*2"]);
        assert_eq!(doc.expressions[0].line, 3);
        assert_eq!(doc.expressions[0].offset, doc.text.find("TOKEN_0").unwrap());
    }

    #[test]
    fn test_multiline_declaration() {
        let doc = run("Intro\n___\nconst a = 1;\nconst b = 2;\n___\n__a + b__");
        assert_eq!(doc.text, "Intro\n% \n% const a = 1;\n% const b = 2;\n% \nTOKEN_0");
        assert_eq!(doc.declarations, vec!["\nconst a = 1;\nconst b = 2;\n".to_string()]);
        assert_eq!(doc.expressions[0].line, 6);
    }

    #[test]
    fn test_declaration_at_start_of_text() {
        let doc = run("___let n = 3;___ and __n__");
        assert_eq!(doc.text, "% let n = 3; and TOKEN_0");
        assert_eq!(doc.declarations, vec!["let n = 3;".to_string()]);
    }

    #[test]
    fn test_triple_underscore_mid_line_is_not_a_declaration() {
        let doc = run("a ___b___ c");
        assert!(doc.declarations.is_empty());
        assert_eq!(sources(&doc), vec!["_b"]);
    }

    #[test]
    fn test_expression_does_not_span_lines() {
        let doc = run("__a\nb and __c__");
        assert_eq!(sources(&doc), vec!["c"]);
        assert_eq!(doc.text, "__a\nb and TOKEN_0");
        assert_eq!(doc.expressions[0].line, 2);
    }

    #[test]
    fn test_declaration_interior_is_not_scanned() {
        let doc = run("\n___const s = \"__x__\";___\n__s__");
        assert_eq!(doc.declarations, vec!["const s = \"__x__\";".to_string()]);
        assert_eq!(sources(&doc), vec!["s"]);
        assert_eq!(doc.text, "\n% const s = \"__x__\";\nTOKEN_0");
    }

    #[test]
    fn test_indices_skip_existing_tokens() {
        let doc = run("TOKEN_4 __1__ __2__");
        assert_eq!(doc.min_index, 5);
        let indices: Vec<usize> = doc.expressions.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![5, 6]);
        assert_eq!(doc.text, "TOKEN_4 TOKEN_5 TOKEN_6");
    }

    #[test]
    fn test_consecutive_declarations() {
        let doc = run("\n___const a = 1;___\n___const b = 2;___\n__a__ __b__");
        assert_eq!(doc.declarations.len(), 2);
        assert_eq!(doc.text, "\n% const a = 1;\n% const b = 2;\nTOKEN_0 TOKEN_1");
        assert_eq!(doc.expressions[1].line, 4);
    }

    #[test]
    fn test_empty_expression() {
        let doc = run("x ____ y");
        assert_eq!(sources(&doc), vec![""]);
    }

    #[test]
    fn test_wrap_comment_style() {
        let mut alloc = PlaceholderAllocator::scan("");
        let doc = extract(
            "\n___let q = 1;___\n",
            &mut alloc,
            &CommentStyle::wrap("<!--", "-->"),
        );
        assert_eq!(doc.text, "\n<!--let q = 1;-->\n");
    }
}

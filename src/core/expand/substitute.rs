//! Placeholder substitution
//!
//! Replaces the generated placeholders recorded during extraction with
//! their evaluated values. Author text that only looks like a placeholder
//! is copied through untouched.

use crate::core::script::{EvalResult, Value};
use crate::utils::error::{Diagnostic, DiagnosticKind, ExpandError, ExpandResult};

use super::extract::ExtractedDocument;

/// Output text of one document plus the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub text: String,
    pub warnings: Vec<Diagnostic>,
}

/// Substitute `values` (one per expression slot, document order) into the
/// extracted text. The first failed value aborts the document.
pub fn substitute<I>(doc: &ExtractedDocument, file: &str, values: I) -> ExpandResult<Substitution>
where
    I: IntoIterator<Item = EvalResult<Value>>,
{
    let mut values = values.into_iter();
    let mut text = String::with_capacity(doc.text.len());
    let mut warnings = Vec::new();
    let mut last = 0;

    for slot in &doc.expressions {
        let value = match values.next() {
            Some(Ok(value)) => value,
            Some(Err(error)) => {
                return Err(ExpandError::expression(
                    file,
                    &slot.source,
                    slot.line,
                    error.format_with_source(&slot.source),
                ));
            }
            None => {
                return Err(ExpandError::expression(
                    file,
                    &slot.source,
                    slot.line,
                    "expression produced no value",
                ));
            }
        };

        if !value.is_scalar() {
            log::debug!("{}:{}: non-scalar {} value", file, slot.line, value.type_name());
            warnings.push(
                Diagnostic::warning(
                    DiagnosticKind::NonScalarValue,
                    file,
                    format!(
                        "Expression __{}__ on line {} evaluates to neither a number nor a string",
                        slot.source, slot.line
                    ),
                )
                .with_line(slot.line),
            );
        }

        text.push_str(&doc.text[last..slot.offset]);
        text.push_str(&value.display());
        last = slot.offset + slot.token().len();
    }
    text.push_str(&doc.text[last..]);

    Ok(Substitution { text, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expand::config::CommentStyle;
    use crate::core::expand::extract::extract;
    use crate::core::expand::placeholder::PlaceholderAllocator;
    use crate::core::script::EvalError;
    use pretty_assertions::assert_eq;

    fn extracted(text: &str) -> ExtractedDocument {
        let mut alloc = PlaceholderAllocator::scan(text);
        extract(text, &mut alloc, &CommentStyle::latex())
    }

    #[test]
    fn test_scalar_substitution() {
        let doc = extracted("a=__x__, b=__y__.");
        let out = substitute(&doc, "t.txs", vec![Ok(Value::from(3.5)), Ok(Value::from("abc"))]).unwrap();
        assert_eq!(out.text, "a=3.5, b=abc.");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_literal_tokens_untouched() {
        let doc = extracted("TOKEN_1 stays, __v__ goes, TOKEN_0 stays");
        let out = substitute(&doc, "t.txs", vec![Ok(Value::from(7.0))]).unwrap();
        assert_eq!(out.text, "TOKEN_1 stays, 7 goes, TOKEN_0 stays");
    }

    #[test]
    fn test_digits_after_block_are_kept() {
        let doc = extracted("__a__2");
        let out = substitute(&doc, "t.txs", vec![Ok(Value::from(1.0))]).unwrap();
        assert_eq!(out.text, "12");
    }

    #[test]
    fn test_non_scalar_warns_with_line() {
        let doc = extracted("first\nsecond __list__\n");
        let list = Value::array(vec![Value::from(1.0), Value::from(2.0)]);
        let out = substitute(&doc, "t.txs", vec![Ok(list)]).unwrap();

        assert_eq!(out.text, "first\nsecond 1,2\n");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].line, Some(2));
        assert_eq!(
            out.warnings[0].message,
            "Expression __list__ on line 2 evaluates to neither a number nor a string"
        );
    }

    #[test]
    fn test_failure_is_attributed() {
        let doc = extracted("ok __1__\n\nbad __nope__");
        let err = substitute(
            &doc,
            "t.txs",
            vec![Ok(Value::from(1.0)), Err(EvalError::undefined("nope"))],
        )
        .unwrap_err();

        assert_eq!(err.file_name(), "t.txs");
        assert_eq!(err.block_source(), Some("nope"));
        assert_eq!(err.line(), Some(3));
        assert!(err.message().contains("nope is not defined"));
    }
}

//! Script Lexer/Tokenizer
//!
//! Converts script source into a flat token list. Handles:
//! - Line (`//`) and block (`/* */`) comments
//! - Numbers, including exponents, leading dots and `0x` hex
//! - Single/double quoted strings and template literals with JS escapes
//! - Longest-match operators

use super::token::{Punct, RawTemplatePart, Spanned, Token, KEYWORDS};
use super::value::{EvalError, EvalResult, SourceSpan};

/// The script lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    /// Byte offset of `input` within the enclosing source (template parts)
    base: usize,
    /// A line break was skipped since the last token
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, 0)
    }

    /// Create a lexer whose spans are shifted by `base` bytes.
    pub fn with_offset(input: &'a str, base: usize) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
            base,
            saw_newline: false,
        }
    }

    /// Tokenize the whole input. The last token is always `Token::Eof`.
    pub fn tokenize(mut self) -> EvalResult<Vec<Spanned>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos();
            let newline_before = std::mem::take(&mut self.saw_newline);
            let token = match self.peek_char() {
                None => Token::Eof,
                Some(_) => self.next_token(start)?,
            };
            let done = token == Token::Eof;
            tokens.push(Spanned {
                token,
                span: self.span_from(start),
                newline_before,
            });
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Current byte offset (relative to `input`)
    fn pos(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    fn span_from(&mut self, start: usize) -> SourceSpan {
        let end = self.pos();
        SourceSpan::new(self.base + start, self.base + end)
    }

    fn error_at(&mut self, start: usize, message: impl Into<String>) -> EvalError {
        let span = self.span_from(start);
        EvalError::syntax(message).with_span(span)
    }

    /// Peek at the next character without consuming it
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Peek at the character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    /// Consume and return the next character
    fn next_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    /// Consume the next character if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments, remembering line breaks
    fn skip_trivia(&mut self) -> EvalResult<()> {
        loop {
            match self.peek_char() {
                Some('\n') => {
                    self.saw_newline = true;
                    self.next_char();
                }
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.next_char();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let start = self.pos();
                    self.next_char();
                    self.next_char();
                    let mut closed = false;
                    while let Some(c) = self.next_char() {
                        if c == '\n' {
                            self.saw_newline = true;
                        }
                        if c == '*' && self.eat('/') {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(self.error_at(start, "unterminated comment"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Read the next token
    fn next_token(&mut self, start: usize) -> EvalResult<Token> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_digit() || (c == '.' && matches!(self.peek_second(), Some(d) if d.is_ascii_digit())) {
            return self.read_number(start);
        }
        if is_ident_start(c) {
            return Ok(self.read_word());
        }
        match c {
            '"' | '\'' => {
                self.next_char();
                self.read_string(start, c)
            }
            '`' => {
                self.next_char();
                self.read_template(start)
            }
            _ => self.read_punct(start),
        }
    }

    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                word.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        match KEYWORDS.get(word.as_str()) {
            Some(kw) => Token::Keyword(*kw),
            None => Token::Ident(word),
        }
    }

    fn read_number(&mut self, start: usize) -> EvalResult<Token> {
        if self.peek_char() == Some('0') && matches!(self.peek_second(), Some('x') | Some('X')) {
            self.next_char();
            self.next_char();
            let mut digits = String::new();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_hexdigit() {
                    digits.push(c);
                    self.next_char();
                } else {
                    break;
                }
            }
            return u64::from_str_radix(&digits, 16)
                .map(|v| Token::Number(v as f64))
                .map_err(|_| self.error_at(start, "invalid hexadecimal literal"));
        }

        let mut text = String::new();
        let mut seen_dot = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.next_char();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                text.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mut ahead = self.chars.clone();
            ahead.next();
            let mut next = ahead.next().map(|(_, c)| c);
            if matches!(next, Some('+') | Some('-')) {
                next = ahead.next().map(|(_, c)| c);
            }
            if matches!(next, Some(d) if d.is_ascii_digit()) {
                text.push('e');
                self.next_char();
                if let Some(sign @ ('+' | '-')) = self.peek_char() {
                    text.push(sign);
                    self.next_char();
                }
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
            }
        }
        if matches!(self.peek_char(), Some(c) if is_ident_start(c)) {
            return Err(self.error_at(start, "identifier starts immediately after numeric literal"));
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| self.error_at(start, format!("invalid number '{}'", text)))
    }

    fn read_string(&mut self, start: usize, quote: char) -> EvalResult<Token> {
        let mut value = String::new();
        loop {
            match self.next_char() {
                None | Some('\n') => return Err(self.error_at(start, "unterminated string literal")),
                Some(c) if c == quote => return Ok(Token::Str(value)),
                Some('\\') => self.read_escape(start, &mut value)?,
                Some(c) => value.push(c),
            }
        }
    }

    /// Read an escape sequence (the backslash is already consumed).
    fn read_escape(&mut self, start: usize, out: &mut String) -> EvalResult<()> {
        let Some(c) = self.next_char() else {
            return Err(self.error_at(start, "unterminated escape sequence"));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuation
            '\n' => {}
            'x' => {
                let code = self.read_hex_digits(2);
                match code.and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => return Err(self.error_at(start, "invalid hexadecimal escape sequence")),
                }
            }
            'u' => {
                let code = if self.eat('{') {
                    let mut digits = String::new();
                    while let Some(d) = self.next_char() {
                        if d == '}' {
                            break;
                        }
                        digits.push(d);
                    }
                    u32::from_str_radix(&digits, 16).ok()
                } else {
                    self.read_hex_digits(4)
                };
                match code.and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => return Err(self.error_at(start, "invalid Unicode escape sequence")),
                }
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut digits = String::with_capacity(count);
        for _ in 0..count {
            digits.push(self.next_char()?);
        }
        u32::from_str_radix(&digits, 16).ok()
    }

    fn read_template(&mut self, start: usize) -> EvalResult<Token> {
        let mut parts = Vec::new();
        let mut text = String::new();
        loop {
            match self.next_char() {
                None => return Err(self.error_at(start, "unterminated template literal")),
                Some('`') => break,
                Some('\\') => self.read_escape(start, &mut text)?,
                Some('$') if self.peek_char() == Some('{') => {
                    self.next_char();
                    if !text.is_empty() {
                        parts.push(RawTemplatePart::Text(std::mem::take(&mut text)));
                    }
                    let offset = self.pos();
                    let source = self.read_interpolation(start)?;
                    parts.push(RawTemplatePart::Expr {
                        source,
                        offset: self.base + offset,
                    });
                }
                Some(c) => text.push(c),
            }
        }
        if !text.is_empty() {
            parts.push(RawTemplatePart::Text(text));
        }
        Ok(Token::Template(parts))
    }

    /// Collect the source of a `${...}` interpolation up to its closing brace.
    fn read_interpolation(&mut self, start: usize) -> EvalResult<String> {
        let mut source = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.next_char() {
            if let Some(q) = quote {
                source.push(c);
                if c == '\\' {
                    if let Some(escaped) = self.next_char() {
                        source.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' | '`' => {
                    quote = Some(c);
                    source.push(c);
                }
                '{' => {
                    depth += 1;
                    source.push(c);
                }
                '}' if depth == 0 => return Ok(source),
                '}' => {
                    depth -= 1;
                    source.push(c);
                }
                _ => source.push(c),
            }
        }
        Err(self.error_at(start, "unterminated template interpolation"))
    }

    fn read_punct(&mut self, start: usize) -> EvalResult<Token> {
        let c = self.next_char().unwrap_or('\0');
        let punct = match c {
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            ',' => Punct::Comma,
            ';' => Punct::Semi,
            ':' => Punct::Colon,
            '.' => {
                if self.peek_char() == Some('.') && self.peek_second() == Some('.') {
                    self.next_char();
                    self.next_char();
                    Punct::Ellipsis
                } else {
                    Punct::Dot
                }
            }
            '?' => {
                if self.eat('?') {
                    Punct::QuestionQuestion
                } else {
                    Punct::Question
                }
            }
            '+' => {
                if self.eat('+') {
                    Punct::PlusPlus
                } else if self.eat('=') {
                    Punct::PlusAssign
                } else {
                    Punct::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    Punct::MinusMinus
                } else if self.eat('=') {
                    Punct::MinusAssign
                } else {
                    Punct::Minus
                }
            }
            '*' => {
                if self.eat('*') {
                    if self.eat('=') {
                        Punct::StarStarAssign
                    } else {
                        Punct::StarStar
                    }
                } else if self.eat('=') {
                    Punct::StarAssign
                } else {
                    Punct::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    Punct::SlashAssign
                } else {
                    Punct::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    Punct::PercentAssign
                } else {
                    Punct::Percent
                }
            }
            '!' => {
                if self.eat('=') {
                    if self.eat('=') {
                        Punct::StrictNotEq
                    } else {
                        Punct::NotEq
                    }
                } else {
                    Punct::Bang
                }
            }
            '=' => {
                if self.eat('=') {
                    if self.eat('=') {
                        Punct::StrictEq
                    } else {
                        Punct::Eq
                    }
                } else if self.eat('>') {
                    Punct::Arrow
                } else {
                    Punct::Assign
                }
            }
            '<' => {
                if self.eat('=') {
                    Punct::Le
                } else {
                    Punct::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Punct::Ge
                } else {
                    Punct::Gt
                }
            }
            '&' if self.eat('&') => Punct::AndAnd,
            '|' if self.eat('|') => Punct::OrOr,
            other => {
                return Err(self.error_at(start, format!("unexpected character '{}'", other)));
            }
        };
        Ok(Token::Punct(punct))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::super::token::Keyword;
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_declaration_tokens() {
        assert_eq!(
            tokens("const x = 2;"),
            vec![
                Token::Keyword(Keyword::Const),
                Token::Ident("x".to_string()),
                Token::Punct(Punct::Assign),
                Token::Number(2.0),
                Token::Punct(Punct::Semi),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("3.5 .5 1e3 2E-2 0xff"),
            vec![
                Token::Number(3.5),
                Token::Number(0.5),
                Token::Number(1000.0),
                Token::Number(0.02),
                Token::Number(255.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_member_access_on_number_is_not_exponent() {
        // `e` not followed by digits stays an identifier start, which is an error
        assert!(Lexer::new("1em").tokenize().is_err());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\nb" 'it\'s' "\\frac" "é""#),
            vec![
                Token::Str("a\nb".to_string()),
                Token::Str("it's".to_string()),
                Token::Str("\\frac".to_string()),
                Token::Str("é".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_match_operators() {
        assert_eq!(
            tokens("a === b !== c ** d => ... ?? ++"),
            vec![
                Token::Ident("a".to_string()),
                Token::Punct(Punct::StrictEq),
                Token::Ident("b".to_string()),
                Token::Punct(Punct::StrictNotEq),
                Token::Ident("c".to_string()),
                Token::Punct(Punct::StarStar),
                Token::Ident("d".to_string()),
                Token::Punct(Punct::Arrow),
                Token::Punct(Punct::Ellipsis),
                Token::Punct(Punct::QuestionQuestion),
                Token::Punct(Punct::PlusPlus),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let spanned = Lexer::new("a // note\n/* block\n */ b").tokenize().unwrap();
        assert_eq!(spanned.len(), 3);
        assert!(!spanned[0].newline_before);
        assert!(spanned[1].newline_before);
        assert_eq!(spanned[1].token, Token::Ident("b".to_string()));
    }

    #[test]
    fn test_template_parts() {
        let toks = tokens("`x = ${a + {b: 1}.b} and ${'}'}`");
        match &toks[0] {
            Token::Template(parts) => {
                assert_eq!(parts.len(), 4);
                assert_eq!(parts[0], RawTemplatePart::Text("x = ".to_string()));
                assert!(matches!(&parts[1], RawTemplatePart::Expr { source, offset }
                    if source == "a + {b: 1}.b" && *offset == 7));
                assert!(matches!(&parts[3], RawTemplatePart::Expr { source, .. } if source == "'}'"));
            }
            other => panic!("expected template, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_string_has_span() {
        let err = Lexer::new("let s = \"abc").tokenize().unwrap_err();
        assert!(err.is_syntax_error());
        assert_eq!(err.span.map(|s| s.start), Some(8));
    }
}

//! Token definitions for the script lexer.

use phf::phf_map;

use super::value::SourceSpan;

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Const,
    Let,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    In,
    Break,
    Continue,
    True,
    False,
    Null,
    Typeof,
    Throw,
}

pub static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "const" => Keyword::Const,
    "let" => Keyword::Let,
    "var" => Keyword::Var,
    "function" => Keyword::Function,
    "return" => Keyword::Return,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "for" => Keyword::For,
    "while" => Keyword::While,
    "in" => Keyword::In,
    "break" => Keyword::Break,
    "continue" => Keyword::Continue,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "typeof" => Keyword::Typeof,
    "throw" => Keyword::Throw,
};

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Const => "const",
            Keyword::Let => "let",
            Keyword::Var => "var",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::In => "in",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::Typeof => "typeof",
            Keyword::Throw => "throw",
        }
    }
}

/// Punctuation and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,
    Question,
    QuestionQuestion,
    Arrow,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    StarStarAssign,
    SlashAssign,
    PercentAssign,
    PlusPlus,
    MinusMinus,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
}

impl Punct {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::Comma => ",",
            Punct::Semi => ";",
            Punct::Colon => ":",
            Punct::Dot => ".",
            Punct::Ellipsis => "...",
            Punct::Question => "?",
            Punct::QuestionQuestion => "??",
            Punct::Arrow => "=>",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::StarStar => "**",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Bang => "!",
            Punct::Assign => "=",
            Punct::PlusAssign => "+=",
            Punct::MinusAssign => "-=",
            Punct::StarAssign => "*=",
            Punct::StarStarAssign => "**=",
            Punct::SlashAssign => "/=",
            Punct::PercentAssign => "%=",
            Punct::PlusPlus => "++",
            Punct::MinusMinus => "--",
            Punct::Eq => "==",
            Punct::StrictEq => "===",
            Punct::NotEq => "!=",
            Punct::StrictNotEq => "!==",
            Punct::Lt => "<",
            Punct::Le => "<=",
            Punct::Gt => ">",
            Punct::Ge => ">=",
            Punct::AndAnd => "&&",
            Punct::OrOr => "||",
        }
    }
}

/// A piece of a template literal before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTemplatePart {
    /// Literal text with escapes already resolved
    Text(String),
    /// Source of an interpolated `${...}` expression and its byte offset
    Expr { source: String, offset: usize },
}

/// A script token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Template(Vec<RawTemplatePart>),
    Ident(String),
    Keyword(Keyword),
    Punct(Punct),
    Eof,
}

impl Token {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Str(_) => "string".to_string(),
            Token::Template(_) => "template literal".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Keyword(kw) => format!("'{}'", kw.as_str()),
            Token::Punct(p) => format!("'{}'", p.as_str()),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: SourceSpan,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

//! Value types for the embedded script interpreter.
//!
//! Values follow JavaScript semantics closely enough that declaration and
//! expression blocks written for a JS host behave the same here: numbers are
//! always `f64`, arrays and objects are shared mutable references, and text
//! rendering matches `String(value)`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::ast::FunctionDef;
use super::scope::Scopes;

/// Shared, mutable array storage.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable object storage (insertion ordered, like JS string keys).
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// Nesting limit when rendering containers (guards self-referencing arrays).
const MAX_DISPLAY_DEPTH: usize = 32;

// ============================================================================
// The Main Value Enum
// ============================================================================

/// A computational value in the script interpreter.
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// A boolean: `true`, `false`
    Bool(bool),
    /// A number: `120`, `3.5`, `NaN`
    Number(f64),
    /// A string: `"hello"`
    Str(String),
    /// An array: `[1, "hi", 3]`
    Array(ArrayRef),
    /// An object literal: `{ a: 1, b: "hi" }`
    Object(ObjectRef),
    /// A user-defined function (closure)
    Func(Rc<Closure>),
    /// A built-in function, identified by its qualified name (`Math.floor`)
    Native(NativeFn),
}

/// A built-in function reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFn(pub &'static str);

impl NativeFn {
    /// The unqualified function name (`floor` for `Math.floor`).
    pub fn short_name(&self) -> &'static str {
        self.0.rsplit('.').next().unwrap_or(self.0)
    }
}

/// Result of the `typeof` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValType {
    Undefined,
    Object,
    Boolean,
    Number,
    String,
    Function,
}

impl ValType {
    pub fn name(&self) -> &'static str {
        match self {
            ValType::Undefined => "undefined",
            ValType::Object => "object",
            ValType::Boolean => "boolean",
            ValType::Number => "number",
            ValType::String => "string",
            ValType::Function => "function",
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl PartialEq for Value {
    /// Strict equality (`===`), except that `NaN` equals itself so values can
    /// be compared in tests.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl Value {
    /// Build an array value from owned items.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Build an object value from owned entries.
    pub fn object(entries: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(entries)))
    }

    /// The `typeof` classification.
    pub fn type_of(&self) -> ValType {
        match self {
            Value::Undefined => ValType::Undefined,
            Value::Null | Value::Array(_) | Value::Object(_) => ValType::Object,
            Value::Bool(_) => ValType::Boolean,
            Value::Number(_) => ValType::Number,
            Value::Str(_) => ValType::String,
            Value::Func(_) | Value::Native(_) => ValType::Function,
        }
    }

    /// A descriptive type name for diagnostics (distinguishes arrays and null).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Func(_) | Value::Native(_) => "function",
        }
    }

    /// Numbers and strings are the only values a template may splice in
    /// without a warning.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Str(_))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Func(_) | Value::Native(_))
    }

    /// Check if this value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Func(_) | Value::Native(_) => true,
        }
    }

    /// Numeric conversion (`Number(value)`).
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => parse_numeric_str(s),
            Value::Array(_) => parse_numeric_str(&self.display()),
            Value::Object(_) | Value::Func(_) | Value::Native(_) => f64::NAN,
        }
    }

    /// Integer conversion used by indexing and counts (truncates toward zero).
    pub fn to_integer(&self) -> i64 {
        let n = self.to_number();
        if n.is_nan() {
            0
        } else {
            n.trunc() as i64
        }
    }

    /// Try to borrow this value as a string slice.
    pub fn as_str(&self) -> Result<&str, EvalError> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(EvalError::type_mismatch("string", self.type_name())),
        }
    }

    /// Try to get the shared array behind this value.
    pub fn as_array(&self) -> Result<&ArrayRef, EvalError> {
        match self {
            Value::Array(arr) => Ok(arr),
            _ => Err(EvalError::type_mismatch("array", self.type_name())),
        }
    }

    /// Strict equality (`===`).
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            _ => false,
        }
    }

    /// Convert this value to text the way `String(value)` does.
    pub fn display(&self) -> String {
        self.display_at(0)
    }

    fn display_at(&self, depth: usize) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(arr) => {
                if depth >= MAX_DISPLAY_DEPTH {
                    return String::new();
                }
                arr.borrow()
                    .iter()
                    .map(|v| {
                        if v.is_nullish() {
                            String::new()
                        } else {
                            v.display_at(depth + 1)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Func(c) => c.def.source.clone(),
            Value::Native(n) => format!("function {}() {{ [native code] }}", n.short_name()),
        }
    }

    /// Developer-facing rendering: strings quoted, containers expanded.
    pub fn repr(&self) -> String {
        self.repr_at(0)
    }

    fn repr_at(&self, depth: usize) -> String {
        if depth >= MAX_DISPLAY_DEPTH {
            return "...".to_string();
        }
        match self {
            Value::Str(s) => format!("{:?}", s),
            Value::Array(arr) => {
                let items: Vec<String> = arr.borrow().iter().map(|v| v.repr_at(depth + 1)).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Object(obj) => {
                let items: Vec<String> = obj
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.repr_at(depth + 1)))
                    .collect();
                if items.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", items.join(", "))
                }
            }
            Value::Func(c) => match &c.def.name {
                Some(name) => format!("[Function: {}]", name),
                None => "[Function (anonymous)]".to_string(),
            },
            Value::Native(n) => format!("[Function: {}]", n.short_name()),
            other => other.display(),
        }
    }

    /// Convert to JSON for `JSON.stringify`. `None` means "omit" (undefined
    /// and functions).
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.to_json_at(0)
    }

    fn to_json_at(&self, depth: usize) -> Option<serde_json::Value> {
        use serde_json::Value as Json;
        if depth >= MAX_DISPLAY_DEPTH {
            return Some(Json::Null);
        }
        match self {
            Value::Undefined | Value::Func(_) | Value::Native(_) => None,
            Value::Null => Some(Json::Null),
            Value::Bool(b) => Some(Json::Bool(*b)),
            Value::Number(n) => Some(number_to_json(*n)),
            Value::Str(s) => Some(Json::String(s.clone())),
            Value::Array(arr) => Some(Json::Array(
                arr.borrow()
                    .iter()
                    .map(|v| v.to_json_at(depth + 1).unwrap_or(Json::Null))
                    .collect(),
            )),
            Value::Object(obj) => {
                let mut map = serde_json::Map::new();
                for (k, v) in obj.borrow().iter() {
                    if let Some(json) = v.to_json_at(depth + 1) {
                        map.insert(k.clone(), json);
                    }
                }
                Some(Json::Object(map))
            }
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Parse a string the way `Number(str)` does.
pub fn parse_numeric_str(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts these spellings, JS does not.
        _ if trimmed.eq_ignore_ascii_case("inf")
            || trimmed.eq_ignore_ascii_case("infinity")
            || trimmed.eq_ignore_ascii_case("nan") =>
        {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Format a number the way JavaScript's `Number.prototype.toString` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}

// ============================================================================
// Closure Type
// ============================================================================

/// A user-defined function together with the scope it closes over.
#[derive(Clone)]
pub struct Closure {
    /// The parsed function (shared with the AST it came from)
    pub def: Rc<FunctionDef>,
    /// Captured scope chain from the defining environment
    pub env: Scopes,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.def.name)
            .field("params", &self.def.params.len())
            .finish()
    }
}

// ============================================================================
// Source Span Types
// ============================================================================

/// A byte range in script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Start byte offset in the source
    pub start: usize,
    /// End byte offset in the source
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering both `self` and `other`.
    pub fn to(self, other: SourceSpan) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Get the length of this span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extract the text covered by this span from a source string.
    pub fn extract<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }

    /// 1-based line and column of the span start within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let start = self.start.min(source.len());
        let prefix = source.get(..start).unwrap_or(source);
        let line = prefix.matches('\n').count() + 1;
        let last_newline = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (line, prefix[last_newline..].chars().count() + 1)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// The kind of evaluation error (without span information).
#[derive(Debug, Clone, PartialEq)]
pub enum EvalErrorKind {
    /// Type mismatch
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// Reference to a name that was never bound
    UndefinedVariable(String),
    /// Invalid operation (e.g. reading a property of `undefined`)
    InvalidOperation(String),
    /// Calling something that is not a function
    NotCallable(String),
    /// Reassigning a `const` binding
    ConstAssignment(String),
    /// Redeclaring a `let`/`const` binding in the same scope
    Redeclaration(String),
    /// Too many iterations (infinite loop protection)
    TooManyIterations { max_iterations: usize },
    /// Recursion depth exceeded (infinite recursion protection)
    RecursionLimitExceeded { max_depth: usize },
    /// Function argument error
    ArgumentError(String),
    /// Syntax error in source
    SyntaxError(String),
    /// A value raised by a `throw` statement
    Thrown(String),
    /// Generic error
    Other(String),
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {}, got {}", expected, got)
            }
            EvalErrorKind::UndefinedVariable(name) => write!(f, "{} is not defined", name),
            EvalErrorKind::InvalidOperation(msg) => write!(f, "invalid operation: {}", msg),
            EvalErrorKind::NotCallable(what) => write!(f, "{} is not a function", what),
            EvalErrorKind::ConstAssignment(name) => {
                write!(f, "assignment to constant variable '{}'", name)
            }
            EvalErrorKind::Redeclaration(name) => {
                write!(f, "identifier '{}' has already been declared", name)
            }
            EvalErrorKind::TooManyIterations { max_iterations } => {
                write!(f, "loop seems infinite (>{} iterations)", max_iterations)
            }
            EvalErrorKind::RecursionLimitExceeded { max_depth } => {
                write!(
                    f,
                    "recursion depth exceeded maximum ({}). Possible infinite recursion.",
                    max_depth
                )
            }
            EvalErrorKind::ArgumentError(msg) => write!(f, "argument error: {}", msg),
            EvalErrorKind::SyntaxError(msg) => write!(f, "syntax error: {}", msg),
            EvalErrorKind::Thrown(msg) => write!(f, "uncaught {}", msg),
            EvalErrorKind::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Errors that can occur during evaluation, with optional source span.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    /// The kind of error
    pub kind: EvalErrorKind,
    /// Optional source span where the error occurred
    pub span: Option<SourceSpan>,
}

impl EvalError {
    /// Create a new error from a kind.
    pub fn new(kind: EvalErrorKind) -> Self {
        Self { kind, span: None }
    }

    /// Attach a span to this error.
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a span only if none is recorded yet (innermost wins).
    pub fn or_span(mut self, span: SourceSpan) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn type_mismatch(expected: &'static str, got: &'static str) -> Self {
        Self::new(EvalErrorKind::TypeMismatch { expected, got })
    }

    pub fn undefined(name: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::UndefinedVariable(name.into()))
    }

    pub fn invalid_op(msg: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::InvalidOperation(msg.into()))
    }

    pub fn not_callable(what: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::NotCallable(what.into()))
    }

    pub fn const_assignment(name: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::ConstAssignment(name.into()))
    }

    pub fn redeclaration(name: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Redeclaration(name.into()))
    }

    pub fn too_many_iterations(max_iterations: usize) -> Self {
        Self::new(EvalErrorKind::TooManyIterations { max_iterations })
    }

    pub fn recursion_limit(max_depth: usize) -> Self {
        Self::new(EvalErrorKind::RecursionLimitExceeded { max_depth })
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::ArgumentError(msg.into()))
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::SyntaxError(msg.into()))
    }

    pub fn thrown(value: &Value) -> Self {
        Self::new(EvalErrorKind::Thrown(value.display()))
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Other(msg.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EvalErrorKind {
        &self.kind
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self.kind, EvalErrorKind::SyntaxError(_))
    }

    /// Format error with source context if available.
    pub fn format_with_source(&self, source: &str) -> String {
        let mut msg = self.kind.to_string();

        if let Some(span) = &self.span {
            let (line, col) = span.line_col(source);
            msg = format!("{}:{}: {}", line, col, msg);

            if let Some(extract) = span.extract(source) {
                let snippet: String = if extract.chars().count() > 40 {
                    format!("{}...", extract.chars().take(40).collect::<String>())
                } else {
                    extract.to_string()
                };
                if !snippet.is_empty() {
                    msg = format!("{}\n  --> `{}`", msg, snippet);
                }
            }
        }

        msg
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_matches_js() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(123456789012.0), "123456789012");
        assert_eq!(format_number(2f64.powi(64)), "18446744073709552000");
        assert_eq!(format_number(123456789012345680000.0), "123456789012345680000");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_containers() {
        let arr = Value::array(vec![
            Value::from(1.0),
            Value::Null,
            Value::from("x"),
            Value::array(vec![Value::from(2.0), Value::from(3.0)]),
        ]);
        assert_eq!(arr.display(), "1,,x,2,3");

        let obj = Value::object(IndexMap::new());
        assert_eq!(obj.display(), "[object Object]");
        assert_eq!(Value::Undefined.display(), "undefined");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert_eq!(Value::from("0x1f").to_number(), 31.0);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::array(vec![Value::from(7.0)]).to_number(), 7.0);
    }

    #[test]
    fn test_scalar_classification() {
        assert!(Value::from(1.0).is_scalar());
        assert!(Value::from("a").is_scalar());
        assert!(!Value::Bool(true).is_scalar());
        assert!(!Value::array(vec![]).is_scalar());
        assert_eq!(Value::Null.type_of(), ValType::Object);
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_span_line_col() {
        let source = "let a = 1;\nlet b = c;";
        let span = SourceSpan::new(19, 20);
        assert_eq!(span.line_col(source), (2, 9));

        let err = EvalError::undefined("c").with_span(span);
        let msg = err.format_with_source(source);
        assert!(msg.starts_with("2:9: c is not defined"), "{}", msg);
    }

    #[test]
    fn test_json_conversion() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), Value::from(1.0));
        entries.insert("skip".to_string(), Value::Undefined);
        entries.insert("b".to_string(), Value::array(vec![Value::from(2.5)]));
        let json = Value::object(entries).to_json().unwrap();
        assert_eq!(json.to_string(), r#"{"a":1,"b":[2.5]}"#);
    }
}

//! Standard library for the script interpreter.
//!
//! Global objects (`Math`, `JSON`, `Object`, `Array`), conversion functions
//! and the methods available on strings, numbers, arrays and objects.
//! Strings are indexed by Unicode scalar value.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use super::value::{format_number, ArrayRef, EvalError, EvalResult, NativeFn, ObjectRef, Value};

/// Result of trying to call a built-in method.
///
/// Distinguishes "no such method" from "method found but failed" so the
/// interpreter can report `x.foo is not a function`.
pub enum BuiltinResult {
    /// Method was found and executed successfully
    Ok(Value),
    /// Method was found but execution failed
    Err(EvalError),
    /// Method was not found
    NotFound,
}

impl From<EvalResult<Value>> for BuiltinResult {
    fn from(result: EvalResult<Value>) -> Self {
        match result {
            Ok(v) => BuiltinResult::Ok(v),
            Err(e) => BuiltinResult::Err(e),
        }
    }
}

/// Callback into the interpreter for built-ins that take functions
/// (`map`, `sort`, `replace` with a replacer, ...).
pub trait Invoke {
    fn invoke(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Value>;
}

const MATH_FUNCTIONS: &[&str] = &[
    "Math.abs",
    "Math.floor",
    "Math.ceil",
    "Math.round",
    "Math.trunc",
    "Math.sign",
    "Math.sqrt",
    "Math.cbrt",
    "Math.pow",
    "Math.exp",
    "Math.log",
    "Math.log2",
    "Math.log10",
    "Math.sin",
    "Math.cos",
    "Math.tan",
    "Math.asin",
    "Math.acos",
    "Math.atan",
    "Math.atan2",
    "Math.min",
    "Math.max",
    "Math.hypot",
];

const OBJECT_FUNCTIONS: &[&str] = &[
    "Object.keys",
    "Object.values",
    "Object.entries",
    "Object.assign",
    "Object.fromEntries",
];

const ARRAY_FUNCTIONS: &[&str] = &["Array.isArray", "Array.from", "Array.of"];

const JSON_FUNCTIONS: &[&str] = &["JSON.stringify", "JSON.parse"];

fn native_entries(functions: &[&'static str]) -> IndexMap<String, Value> {
    functions
        .iter()
        .map(|name| {
            let native = NativeFn(*name);
            (native.short_name().to_string(), Value::Native(native))
        })
        .collect()
}

/// The global bindings every interpreter starts with.
pub fn globals() -> IndexMap<String, Value> {
    let mut math = IndexMap::new();
    for (name, value) in [
        ("PI", std::f64::consts::PI),
        ("E", std::f64::consts::E),
        ("LN2", std::f64::consts::LN_2),
        ("LN10", std::f64::consts::LN_10),
        ("LOG2E", std::f64::consts::LOG2_E),
        ("LOG10E", std::f64::consts::LOG10_E),
        ("SQRT2", std::f64::consts::SQRT_2),
        ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ] {
        math.insert(name.to_string(), Value::Number(value));
    }
    math.extend(native_entries(MATH_FUNCTIONS));

    let mut globals = IndexMap::new();
    globals.insert("undefined".to_string(), Value::Undefined);
    globals.insert("NaN".to_string(), Value::Number(f64::NAN));
    globals.insert("Infinity".to_string(), Value::Number(f64::INFINITY));
    globals.insert("Math".to_string(), Value::object(math));
    globals.insert("Object".to_string(), Value::object(native_entries(OBJECT_FUNCTIONS)));
    globals.insert("Array".to_string(), Value::object(native_entries(ARRAY_FUNCTIONS)));
    globals.insert("JSON".to_string(), Value::object(native_entries(JSON_FUNCTIONS)));
    for name in ["String", "Number", "Boolean", "parseInt", "parseFloat", "isNaN", "isFinite"] {
        globals.insert(name.to_string(), Value::Native(NativeFn(name)));
    }
    globals
}

// ============================================================================
// Argument helpers
// ============================================================================

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

/// An argument that was passed and is not `undefined`.
fn given(args: &[Value], i: usize) -> Option<&Value> {
    args.get(i).filter(|v| !matches!(v, Value::Undefined))
}

/// Resolve a possibly negative index against `len` (slice semantics).
fn relative_index(value: Option<&Value>, len: usize, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };
    let n = value.to_number();
    if n.is_nan() {
        return 0;
    }
    if n < 0.0 {
        (len as f64 + n.trunc()).max(0.0) as usize
    } else {
        n.trunc().min(len as f64) as usize
    }
}

fn callback<'a>(args: &'a [Value], method: &str) -> EvalResult<&'a Value> {
    match args.first() {
        Some(f) if f.is_callable() => Ok(f),
        Some(other) => Err(EvalError::not_callable(format!(
            "{} (argument to {})",
            other.repr(),
            method
        ))),
        None => Err(EvalError::not_callable(format!("undefined (argument to {})", method))),
    }
}

fn read_error(receiver: &Value, key: &str) -> EvalError {
    EvalError::invalid_op(format!(
        "cannot read properties of {} (reading '{}')",
        receiver.display(),
        key
    ))
}

/// Parse a canonical array index (`"3"`, not `"03"` or `"3.0"`).
fn array_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    (idx.to_string() == key).then_some(idx)
}

// ============================================================================
// Property access
// ============================================================================

/// Read `receiver[key]`.
pub fn get_property(receiver: &Value, key: &str) -> EvalResult<Value> {
    Ok(match receiver {
        Value::Undefined | Value::Null => return Err(read_error(receiver, key)),
        Value::Str(s) => match key {
            "length" => Value::from(s.chars().count()),
            _ => array_index(key)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .unwrap_or_default(),
        },
        Value::Array(arr) => {
            let arr = arr.borrow();
            match key {
                "length" => Value::from(arr.len()),
                _ => array_index(key)
                    .and_then(|i| arr.get(i).cloned())
                    .unwrap_or_default(),
            }
        }
        Value::Object(obj) => obj.borrow().get(key).cloned().unwrap_or_default(),
        Value::Native(native) => native_property(*native, key).unwrap_or_default(),
        Value::Func(closure) => match key {
            "name" => Value::Str(closure.def.name.clone().unwrap_or_default()),
            "length" => Value::from(closure.def.params.len()),
            _ => Value::Undefined,
        },
        Value::Bool(_) | Value::Number(_) => Value::Undefined,
    })
}

/// Write `receiver[key] = value`.
pub fn set_property(receiver: &Value, key: &str, value: Value) -> EvalResult<()> {
    match receiver {
        Value::Undefined | Value::Null => Err(EvalError::invalid_op(format!(
            "cannot set properties of {} (setting '{}')",
            receiver.display(),
            key
        ))),
        Value::Object(obj) => {
            obj.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            let mut arr = arr.borrow_mut();
            if key == "length" {
                let n = value.to_number();
                if n < 0.0 || n.fract() != 0.0 || n > MAX_ARRAY_LENGTH as f64 {
                    return Err(EvalError::invalid_op("invalid array length"));
                }
                arr.resize(n as usize, Value::Undefined);
                return Ok(());
            }
            let idx = array_index(key)
                .ok_or_else(|| EvalError::invalid_op(format!("cannot set property '{}' on an array", key)))?;
            if idx >= MAX_ARRAY_LENGTH {
                return Err(EvalError::invalid_op("invalid array length"));
            }
            if idx >= arr.len() {
                arr.resize(idx + 1, Value::Undefined);
            }
            arr[idx] = value;
            Ok(())
        }
        // Primitives silently drop property writes.
        _ => Ok(()),
    }
}

const MAX_ARRAY_LENGTH: usize = 1 << 24;
/// Longest string (in bytes) a script may build.
pub(crate) const MAX_STRING_LENGTH: usize = 1 << 24;

fn invalid_string_length() -> EvalError {
    EvalError::argument("invalid string length")
}

/// Reject strings past [`MAX_STRING_LENGTH`].
pub(crate) fn check_string_length(value: Value) -> EvalResult<Value> {
    match &value {
        Value::Str(s) if s.len() > MAX_STRING_LENGTH => Err(invalid_string_length()),
        _ => Ok(value),
    }
}

fn native_property(native: NativeFn, key: &str) -> Option<Value> {
    let value = match (native.0, key) {
        (_, "name") => Value::from(native.short_name()),
        ("Number", "isInteger") => Value::Native(NativeFn("Number.isInteger")),
        ("Number", "isFinite") => Value::Native(NativeFn("Number.isFinite")),
        ("Number", "isNaN") => Value::Native(NativeFn("Number.isNaN")),
        ("Number", "parseFloat") => Value::Native(NativeFn("parseFloat")),
        ("Number", "parseInt") => Value::Native(NativeFn("parseInt")),
        ("Number", "MAX_SAFE_INTEGER") => Value::Number(9007199254740991.0),
        ("Number", "MIN_SAFE_INTEGER") => Value::Number(-9007199254740991.0),
        ("Number", "EPSILON") => Value::Number(f64::EPSILON),
        ("Number", "MAX_VALUE") => Value::Number(f64::MAX),
        ("Number", "POSITIVE_INFINITY") => Value::Number(f64::INFINITY),
        ("Number", "NEGATIVE_INFINITY") => Value::Number(f64::NEG_INFINITY),
        ("Number", "NaN") => Value::Number(f64::NAN),
        ("String", "fromCharCode") => Value::Native(NativeFn("String.fromCharCode")),
        _ => return None,
    };
    Some(value)
}

// ============================================================================
// Global functions
// ============================================================================

/// Call a built-in function.
pub fn call_native(native: NativeFn, args: Vec<Value>, invoke: &mut dyn Invoke) -> EvalResult<Value> {
    let name = native.0;
    if let Some(function) = name.strip_prefix("Math.") {
        return call_math(function, &args);
    }
    match name {
        "String" => Ok(Value::Str(args.first().map(Value::display).unwrap_or_default())),
        "Number" => Ok(Value::Number(args.first().map(Value::to_number).unwrap_or(0.0))),
        "Boolean" => Ok(Value::Bool(arg(&args, 0).is_truthy())),
        "parseInt" => {
            let radix = given(&args, 1).map(|r| r.to_integer()).unwrap_or(0);
            Ok(Value::Number(parse_int(&arg(&args, 0).display(), radix)))
        }
        "parseFloat" => Ok(Value::Number(parse_float(&arg(&args, 0).display()))),
        "isNaN" => Ok(Value::Bool(arg(&args, 0).to_number().is_nan())),
        "isFinite" => Ok(Value::Bool(arg(&args, 0).to_number().is_finite())),
        "Number.isInteger" => Ok(Value::Bool(
            matches!(arg(&args, 0), Value::Number(n) if n.is_finite() && n.fract() == 0.0),
        )),
        "Number.isFinite" => Ok(Value::Bool(matches!(arg(&args, 0), Value::Number(n) if n.is_finite()))),
        "Number.isNaN" => Ok(Value::Bool(matches!(arg(&args, 0), Value::Number(n) if n.is_nan()))),
        "String.fromCharCode" => Ok(Value::Str(
            args.iter()
                .filter_map(|v| char::from_u32(v.to_integer() as u32))
                .collect(),
        )),
        "Array.isArray" => Ok(Value::Bool(matches!(arg(&args, 0), Value::Array(_)))),
        "Array.of" => Ok(Value::array(args)),
        "Array.from" => array_from(&args, invoke),
        "Object.keys" => Ok(Value::array(
            own_entries(&arg(&args, 0))?.into_iter().map(|(k, _)| Value::Str(k)).collect(),
        )),
        "Object.values" => Ok(Value::array(
            own_entries(&arg(&args, 0))?.into_iter().map(|(_, v)| v).collect(),
        )),
        "Object.entries" => Ok(Value::array(
            own_entries(&arg(&args, 0))?
                .into_iter()
                .map(|(k, v)| Value::array(vec![Value::Str(k), v]))
                .collect(),
        )),
        "Object.assign" => {
            let target = arg(&args, 0);
            for source in args.iter().skip(1) {
                if source.is_nullish() {
                    continue;
                }
                for (k, v) in own_entries(source)? {
                    set_property(&target, &k, v)?;
                }
            }
            Ok(target)
        }
        "Object.fromEntries" => {
            let pairs = arg(&args, 0);
            let pairs = pairs.as_array()?.borrow().clone();
            let mut entries = IndexMap::new();
            for pair in pairs {
                let key = get_property(&pair, "0")?;
                let value = get_property(&pair, "1")?;
                entries.insert(property_key(&key), value);
            }
            Ok(Value::object(entries))
        }
        "JSON.stringify" => json_stringify(&args),
        "JSON.parse" => json_parse(&arg(&args, 0).display()),
        _ => Err(EvalError::not_callable(name)),
    }
}

/// The string key used when a value indexes an object or array.
pub fn property_key(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        other => other.display(),
    }
}

/// Enumerable own properties, in order (`Object.entries`, `for...in`).
pub fn own_entries(value: &Value) -> EvalResult<Vec<(String, Value)>> {
    Ok(match value {
        Value::Undefined | Value::Null => {
            return Err(EvalError::invalid_op(format!(
                "cannot convert {} to object",
                value.display()
            )))
        }
        Value::Object(obj) => obj
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        Value::Array(arr) => arr
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::Str(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::Str(c.to_string())))
            .collect(),
        _ => Vec::new(),
    })
}

/// Items produced by iterating a value (`for...of`, spread, `Array.from`).
pub fn iterate(value: &Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::Array(arr) => Ok(arr.borrow().clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(EvalError::invalid_op(format!("{} is not iterable", other.repr()))),
    }
}

fn array_from(args: &[Value], invoke: &mut dyn Invoke) -> EvalResult<Value> {
    let source = arg(args, 0);
    let items = match &source {
        Value::Array(_) | Value::Str(_) => iterate(&source)?,
        // Array-like: `Array.from({ length: 3 }, (_, i) => i)`
        Value::Object(obj) => {
            let len = obj.borrow().get("length").map(Value::to_integer).unwrap_or(0);
            if len < 0 || len as usize > MAX_ARRAY_LENGTH {
                return Err(EvalError::invalid_op("invalid array length"));
            }
            (0..len as usize)
                .map(|i| obj.borrow().get(&i.to_string()).cloned().unwrap_or_default())
                .collect()
        }
        Value::Undefined | Value::Null => {
            return Err(EvalError::invalid_op(format!("{} is not iterable", source.display())))
        }
        _ => Vec::new(),
    };
    let Some(mapper) = given(args, 1) else {
        return Ok(Value::array(items));
    };
    let mapped = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| invoke.invoke(mapper, vec![item, Value::from(i)]))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Value::array(mapped))
}

fn call_math(function: &str, args: &[Value]) -> EvalResult<Value> {
    let x = arg(args, 0).to_number();
    let y = arg(args, 1).to_number();
    let n = match function {
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => {
            let f = x.floor();
            if x - f >= 0.5 {
                f + 1.0
            } else {
                f
            }
        }
        "trunc" => x.trunc(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "pow" => super::ops::binary(super::ast::BinaryOp::Pow, &Value::Number(x), &Value::Number(y))
            .to_number(),
        "exp" => x.exp(),
        "log" => x.ln(),
        "log2" => x.log2(),
        "log10" => x.log10(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "atan2" => x.atan2(y),
        "min" => fold_numbers(args, f64::INFINITY, f64::min),
        "max" => fold_numbers(args, f64::NEG_INFINITY, f64::max),
        "hypot" => args
            .iter()
            .map(|v| v.to_number().powi(2))
            .sum::<f64>()
            .sqrt(),
        _ => return Err(EvalError::not_callable(format!("Math.{}", function))),
    };
    Ok(Value::Number(n))
}

/// `Math.min`/`Math.max`: any `NaN` argument poisons the result.
fn fold_numbers(args: &[Value], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    args.iter().map(Value::to_number).fold(init, |acc, n| {
        if acc.is_nan() || n.is_nan() {
            f64::NAN
        } else {
            f(acc, n)
        }
    })
}

/// `parseInt`: longest valid digit prefix after optional sign and `0x`.
pub fn parse_int(text: &str, radix: i64) -> f64 {
    let s = text.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut radix = radix;
    let mut s = s;
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut value = 0.0;
    let mut any = false;
    for c in s.chars() {
        match c.to_digit(radix as u32) {
            Some(d) => {
                value = value * radix as f64 + d as f64;
                any = true;
            }
            None => break,
        }
    }
    match (any, negative) {
        (false, _) => f64::NAN,
        (true, true) => -value,
        (true, false) => value,
    }
}

/// `parseFloat`: longest prefix that reads as a decimal literal.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].trim_end_matches('.').parse::<f64>().unwrap_or(f64::NAN)
}

fn json_stringify(args: &[Value]) -> EvalResult<Value> {
    let Some(json) = arg(args, 0).to_json() else {
        return Ok(Value::Undefined);
    };
    let indent = match given(args, 2) {
        Some(Value::Number(n)) => " ".repeat(n.clamp(0.0, 10.0) as usize),
        Some(Value::Str(s)) => s.chars().take(10).collect(),
        _ => String::new(),
    };
    if indent.is_empty() {
        return Ok(Value::Str(json.to_string()));
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    json.serialize(&mut serializer)
        .map_err(|e| EvalError::other(format!("JSON.stringify: {}", e)))?;
    String::from_utf8(buf)
        .map(Value::Str)
        .map_err(|e| EvalError::other(format!("JSON.stringify: {}", e)))
}

fn json_parse(text: &str) -> EvalResult<Value> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| EvalError::thrown(&Value::Str(format!("SyntaxError: {}", e))))?;
    Ok(json_to_value(json))
}

fn json_to_value(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::array(items.into_iter().map(json_to_value).collect()),
        Json::Object(map) => Value::object(map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect()),
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Call `receiver.method(args)` for built-in receivers.
pub fn call_method(
    receiver: &Value,
    method: &str,
    args: Vec<Value>,
    invoke: &mut dyn Invoke,
) -> BuiltinResult {
    match receiver {
        Value::Undefined | Value::Null => BuiltinResult::Err(read_error(receiver, method)),
        Value::Str(s) => call_str_method(s, method, &args, invoke),
        Value::Number(n) => call_number_method(*n, method, &args),
        Value::Array(arr) => call_array_method(arr, method, args, invoke),
        Value::Object(obj) => call_object_method(obj, method, &args),
        Value::Bool(_) | Value::Func(_) | Value::Native(_) => match method {
            "toString" => BuiltinResult::Ok(Value::Str(receiver.display())),
            _ => BuiltinResult::NotFound,
        },
    }
}

fn char_index(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn substring(chars: &[char], start: usize, end: usize) -> Value {
    if start >= end {
        return Value::Str(String::new());
    }
    Value::Str(chars[start..end].iter().collect())
}

fn pad(s: &str, args: &[Value], at_start: bool) -> EvalResult<Value> {
    let target = arg(args, 0).to_number();
    let filler: Vec<char> = given(args, 1)
        .map(Value::display)
        .unwrap_or_else(|| " ".to_string())
        .chars()
        .collect();
    let len = s.chars().count();
    if !(target > len as f64) || filler.is_empty() {
        return Ok(Value::Str(s.to_string()));
    }
    let max_filler = filler.iter().map(|c| c.len_utf8()).max().unwrap_or(1);
    if target * max_filler as f64 > MAX_STRING_LENGTH as f64 {
        return Err(invalid_string_length());
    }
    let padding: String = filler.iter().cycle().take(target as usize - len).collect();
    Ok(Value::Str(if at_start {
        padding + s
    } else {
        s.to_string() + &padding
    }))
}

fn replace(
    s: &str,
    args: &[Value],
    all: bool,
    invoke: &mut dyn Invoke,
) -> EvalResult<Value> {
    let pattern = arg(args, 0).display();
    let replacement = arg(args, 1);
    let mut out = String::new();
    let mut last = 0;
    let matches: Vec<usize> = if pattern.is_empty() {
        if all {
            s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len())).collect()
        } else {
            vec![0]
        }
    } else if all {
        s.match_indices(&pattern).map(|(i, _)| i).collect()
    } else {
        s.find(&pattern).into_iter().collect()
    };
    for at in matches {
        out.push_str(&s[last..at]);
        let text = if replacement.is_callable() {
            invoke
                .invoke(
                    &replacement,
                    vec![
                        Value::Str(pattern.clone()),
                        Value::from(char_index(s, at)),
                        Value::from(s),
                    ],
                )?
                .display()
        } else {
            replacement.display().replace("$&", &pattern)
        };
        out.push_str(&text);
        last = at + pattern.len();
    }
    out.push_str(&s[last..]);
    Ok(Value::Str(out))
}

fn call_str_method(s: &str, method: &str, args: &[Value], invoke: &mut dyn Invoke) -> BuiltinResult {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let result: EvalResult<Value> = match method {
        "charAt" => {
            let i = arg(args, 0).to_integer();
            Ok(Value::Str(
                usize::try_from(i)
                    .ok()
                    .and_then(|i| chars.get(i))
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            ))
        }
        "charCodeAt" | "codePointAt" => {
            let i = arg(args, 0).to_integer();
            Ok(usize::try_from(i)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::from(*c as u32 as f64))
                .unwrap_or(Value::Number(f64::NAN)))
        }
        "at" => {
            let i = arg(args, 0).to_integer();
            let idx = if i < 0 { len as i64 + i } else { i };
            Ok(usize::try_from(idx)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::Str(c.to_string()))
                .unwrap_or_default())
        }
        "indexOf" => {
            let needle = arg(args, 0).display();
            let from = relative_index(given(args, 1), len, 0);
            let offset: usize = chars[..from].iter().map(|c| c.len_utf8()).sum();
            Ok(match s[offset..].find(&needle) {
                Some(byte) => Value::from(char_index(s, offset + byte)),
                None => Value::from(-1.0),
            })
        }
        "lastIndexOf" => {
            let needle = arg(args, 0).display();
            Ok(match s.rfind(&needle) {
                Some(byte) => Value::from(char_index(s, byte)),
                None => Value::from(-1.0),
            })
        }
        "includes" => Ok(Value::Bool(s.contains(&arg(args, 0).display()))),
        "startsWith" => Ok(Value::Bool(s.starts_with(&arg(args, 0).display()))),
        "endsWith" => Ok(Value::Bool(s.ends_with(&arg(args, 0).display()))),
        "slice" => {
            let start = relative_index(given(args, 0), len, 0);
            let end = relative_index(given(args, 1), len, len);
            Ok(substring(&chars, start, end))
        }
        "substring" => {
            let clamp = |v: Option<&Value>, default: usize| match v {
                None => default,
                Some(v) => {
                    let n = v.to_number();
                    if n.is_nan() {
                        0
                    } else {
                        n.clamp(0.0, len as f64) as usize
                    }
                }
            };
            let a = clamp(given(args, 0), 0);
            let b = clamp(given(args, 1), len);
            Ok(substring(&chars, a.min(b), a.max(b)))
        }
        "substr" => {
            let start = relative_index(given(args, 0), len, 0);
            let count = given(args, 1)
                .map(|v| v.to_integer().max(0) as usize)
                .unwrap_or(len);
            Ok(substring(&chars, start, start.saturating_add(count).min(len)))
        }
        "toUpperCase" | "toLocaleUpperCase" => Ok(Value::Str(s.to_uppercase())),
        "toLowerCase" | "toLocaleLowerCase" => Ok(Value::Str(s.to_lowercase())),
        "trim" => Ok(Value::Str(s.trim().to_string())),
        "trimStart" => Ok(Value::Str(s.trim_start().to_string())),
        "trimEnd" => Ok(Value::Str(s.trim_end().to_string())),
        "padStart" => pad(s, args, true),
        "padEnd" => pad(s, args, false),
        "repeat" => {
            let n = arg(args, 0).to_number();
            if n < 0.0 || n.is_infinite() {
                Err(EvalError::argument(format!("invalid count value: {}", format_number(n))))
            } else if s.is_empty() || n < 1.0 {
                Ok(Value::Str(String::new()))
            } else if n * s.len() as f64 > MAX_STRING_LENGTH as f64 {
                Err(invalid_string_length())
            } else {
                Ok(Value::Str(s.repeat(n as usize)))
            }
        }
        "split" => {
            let limit = given(args, 1)
                .map(|v| v.to_integer().max(0) as usize)
                .unwrap_or(usize::MAX);
            let parts: Vec<Value> = match given(args, 0) {
                None => vec![Value::from(s)],
                Some(sep) => {
                    let sep = sep.display();
                    if sep.is_empty() {
                        chars.iter().map(|c| Value::Str(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(Value::from).collect()
                    }
                }
            };
            Ok(Value::array(parts.into_iter().take(limit).collect()))
        }
        "replace" => replace(s, args, false, invoke),
        "replaceAll" => replace(s, args, true, invoke),
        "concat" => Ok(Value::Str(
            args.iter().fold(s.to_string(), |acc, v| acc + &v.display()),
        )),
        "toString" | "valueOf" => Ok(Value::from(s)),
        _ => return BuiltinResult::NotFound,
    };
    result.into()
}

/// `Number.prototype.toFixed`: ties round away from zero.
pub fn to_fixed(n: f64, digits: i64) -> EvalResult<String> {
    if !(0..=100).contains(&digits) {
        return Err(EvalError::argument(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(format_number(n));
    }
    let precision = digits as usize;
    let x = n.abs();
    let scale = 10f64.powi(digits as i32);
    let scaled = x * scale;
    let text = if scaled < 9.0e15 && scaled.fract() == 0.5 {
        format!("{:.*}", precision, (scaled.floor() + 1.0) / scale)
    } else {
        format!("{:.*}", precision, x)
    };
    Ok(if n < 0.0 { format!("-{}", text) } else { text })
}

/// `Number.prototype.toString(radix)`.
pub fn to_radix_string(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return format_number(n);
    }
    let r = radix as f64;
    let mut int = n.abs().trunc();
    let mut frac = n.abs().fract();
    let mut digits = Vec::new();
    if int == 0.0 {
        digits.push('0');
    }
    while int >= 1.0 {
        let d = (int % r) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        int = (int / r).trunc();
    }
    digits.reverse();
    let mut out: String = digits.into_iter().collect();
    if frac > 0.0 {
        out.push('.');
        for _ in 0..52 {
            frac *= r;
            let d = frac.trunc();
            out.push(std::char::from_digit(d as u32, radix).unwrap_or('0'));
            frac -= d;
            if frac == 0.0 {
                break;
            }
        }
    }
    if n < 0.0 {
        out.insert(0, '-');
    }
    out
}

fn call_number_method(n: f64, method: &str, args: &[Value]) -> BuiltinResult {
    let result: EvalResult<Value> = match method {
        "toFixed" => to_fixed(n, arg(args, 0).to_integer()).map(Value::Str),
        "toString" => {
            let radix = given(args, 0).map(|r| r.to_integer()).unwrap_or(10);
            if (2..=36).contains(&radix) {
                Ok(Value::Str(to_radix_string(n, radix as u32)))
            } else {
                Err(EvalError::argument("toString() radix must be between 2 and 36"))
            }
        }
        "valueOf" => Ok(Value::Number(n)),
        _ => return BuiltinResult::NotFound,
    };
    result.into()
}

fn call_object_method(obj: &ObjectRef, method: &str, args: &[Value]) -> BuiltinResult {
    match method {
        "hasOwnProperty" => {
            BuiltinResult::Ok(Value::Bool(obj.borrow().contains_key(&property_key(&arg(args, 0)))))
        }
        "toString" => BuiltinResult::Ok(Value::from("[object Object]")),
        _ => BuiltinResult::NotFound,
    }
}

/// Default `sort` order: by string form, `undefined` last.
fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => Ordering::Equal,
        (Value::Undefined, _) => Ordering::Greater,
        (_, Value::Undefined) => Ordering::Less,
        _ => a.display().cmp(&b.display()),
    }
}

/// Stable merge sort with a fallible comparator. Inconsistent comparators
/// produce some order instead of panicking.
fn merge_sort(
    items: Vec<Value>,
    cmp: &mut dyn FnMut(&Value, &Value) -> EvalResult<Ordering>,
) -> EvalResult<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort(left, cmp)?;
    let right = merge_sort(right, cmp)?;
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
        if cmp(a, b)? == Ordering::Greater {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

fn flatten_into(out: &mut Vec<Value>, items: Vec<Value>, depth: i64) {
    for item in items {
        match &item {
            Value::Array(inner) if depth > 0 => {
                let inner = inner.borrow().clone();
                flatten_into(out, inner, depth - 1);
            }
            _ => out.push(item),
        }
    }
}

fn call_array_method(
    arr: &ArrayRef,
    method: &str,
    args: Vec<Value>,
    invoke: &mut dyn Invoke,
) -> BuiltinResult {
    let this = Value::Array(arr.clone());
    let len = arr.borrow().len();
    let result: EvalResult<Value> = match method {
        "push" => {
            let mut items = arr.borrow_mut();
            items.extend(args);
            Ok(Value::from(items.len()))
        }
        "pop" => Ok(arr.borrow_mut().pop().unwrap_or_default()),
        "shift" => {
            let mut items = arr.borrow_mut();
            Ok(if items.is_empty() {
                Value::Undefined
            } else {
                items.remove(0)
            })
        }
        "unshift" => {
            let mut items = arr.borrow_mut();
            for (i, v) in args.into_iter().enumerate() {
                items.insert(i, v);
            }
            Ok(Value::from(items.len()))
        }
        "slice" => {
            let start = relative_index(given(&args, 0), len, 0);
            let end = relative_index(given(&args, 1), len, len);
            let items = arr.borrow();
            Ok(Value::array(if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            }))
        }
        "splice" => {
            let start = relative_index(given(&args, 0), len, 0);
            let count = match args.get(1) {
                None => len - start,
                Some(v) => (v.to_integer().max(0) as usize).min(len - start),
            };
            let inserted: Vec<Value> = args.into_iter().skip(2).collect();
            let removed: Vec<Value> = arr.borrow_mut().splice(start..start + count, inserted).collect();
            Ok(Value::array(removed))
        }
        "concat" => {
            let mut items = arr.borrow().clone();
            for v in &args {
                match v {
                    Value::Array(other) => items.extend(other.borrow().iter().cloned()),
                    other => items.push(other.clone()),
                }
            }
            Ok(Value::array(items))
        }
        "join" => {
            let sep = given(&args, 0).map(Value::display).unwrap_or_else(|| ",".to_string());
            Ok(Value::Str(
                arr.borrow()
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.display() })
                    .collect::<Vec<_>>()
                    .join(&sep),
            ))
        }
        "indexOf" => {
            let needle = arg(&args, 0);
            let from = relative_index(given(&args, 1), len, 0);
            Ok(arr
                .borrow()
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, v)| v.strict_equals(&needle))
                .map(|(i, _)| Value::from(i))
                .unwrap_or(Value::from(-1.0)))
        }
        "lastIndexOf" => {
            let needle = arg(&args, 0);
            Ok(arr
                .borrow()
                .iter()
                .rposition(|v| v.strict_equals(&needle))
                .map(Value::from)
                .unwrap_or(Value::from(-1.0)))
        }
        // SameValueZero: NaN is found
        "includes" => {
            let needle = arg(&args, 0);
            Ok(Value::Bool(arr.borrow().iter().any(|v| *v == needle)))
        }
        "reverse" => {
            arr.borrow_mut().reverse();
            Ok(this)
        }
        "at" => {
            let i = arg(&args, 0).to_integer();
            let idx = if i < 0 { len as i64 + i } else { i };
            Ok(usize::try_from(idx)
                .ok()
                .and_then(|i| arr.borrow().get(i).cloned())
                .unwrap_or_default())
        }
        "fill" => {
            let value = arg(&args, 0);
            let start = relative_index(given(&args, 1), len, 0);
            let end = relative_index(given(&args, 2), len, len);
            for slot in arr.borrow_mut().iter_mut().take(end).skip(start) {
                *slot = value.clone();
            }
            Ok(this)
        }
        "flat" => {
            let depth = given(&args, 0).map(Value::to_integer).unwrap_or(1);
            let mut out = Vec::new();
            flatten_into(&mut out, arr.borrow().clone(), depth);
            Ok(Value::array(out))
        }
        "toString" => Ok(Value::Str(this.display())),
        "map" | "filter" | "forEach" | "find" | "findIndex" | "some" | "every" | "flatMap" => {
            iterate_with(arr, method, &args, invoke)
        }
        "reduce" => {
            let items = arr.borrow().clone();
            callback(&args, method).and_then(|f| {
                let mut iter = items.into_iter().enumerate();
                let mut acc = match args.get(1) {
                    Some(init) => init.clone(),
                    None => match iter.next() {
                        Some((_, first)) => first,
                        None => {
                            return Err(EvalError::invalid_op(
                                "reduce of empty array with no initial value",
                            ))
                        }
                    },
                };
                for (i, item) in iter {
                    acc = invoke.invoke(f, vec![acc, item, Value::from(i), this.clone()])?;
                }
                Ok(acc)
            })
        }
        "sort" => {
            let items = arr.borrow().clone();
            let sorted = match given(&args, 0) {
                None => merge_sort(items, &mut |a, b| Ok(default_order(a, b))),
                Some(f) if f.is_callable() => merge_sort(items, &mut |a, b| {
                    if a.is_nullish() || b.is_nullish() {
                        return Ok(default_order(a, b));
                    }
                    let n = invoke.invoke(f, vec![a.clone(), b.clone()])?.to_number();
                    Ok(if n > 0.0 {
                        Ordering::Greater
                    } else if n < 0.0 {
                        Ordering::Less
                    } else {
                        Ordering::Equal
                    })
                }),
                Some(other) => Err(EvalError::argument(format!(
                    "the comparison function must be a function, got {}",
                    other.type_name()
                ))),
            };
            sorted.map(|sorted| {
                *arr.borrow_mut() = sorted;
                this
            })
        }
        _ => return BuiltinResult::NotFound,
    };
    result.into()
}

/// Array methods that call a function once per element.
fn iterate_with(
    arr: &ArrayRef,
    method: &str,
    args: &[Value],
    invoke: &mut dyn Invoke,
) -> EvalResult<Value> {
    let f = callback(args, method)?;
    let this = Value::Array(arr.clone());
    let items = arr.borrow().clone();
    let mut mapped = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let result = invoke.invoke(f, vec![item.clone(), Value::from(i), this.clone()])?;
        match method {
            "map" => mapped.push(result),
            "flatMap" => flatten_into(&mut mapped, vec![result], 1),
            "filter" if result.is_truthy() => mapped.push(item),
            "find" if result.is_truthy() => return Ok(item),
            "findIndex" if result.is_truthy() => return Ok(Value::from(i)),
            "some" if result.is_truthy() => return Ok(Value::Bool(true)),
            "every" if !result.is_truthy() => return Ok(Value::Bool(false)),
            _ => {}
        }
    }
    Ok(match method {
        "map" | "filter" | "flatMap" => Value::array(mapped),
        "findIndex" => Value::from(-1.0),
        "some" => Value::Bool(false),
        "every" => Value::Bool(true),
        _ => Value::Undefined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Calls natives directly: only closure-free callbacks are supported.
    struct NativeOnly;

    impl Invoke for NativeOnly {
        fn invoke(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Value> {
            match callee {
                Value::Native(native) => call_native(*native, args, self),
                other => Err(EvalError::not_callable(other.repr())),
            }
        }
    }

    fn method(receiver: &Value, name: &str, args: Vec<Value>) -> Value {
        match call_method(receiver, name, args, &mut NativeOnly) {
            BuiltinResult::Ok(v) => v,
            BuiltinResult::Err(e) => panic!("{} failed: {}", name, e),
            BuiltinResult::NotFound => panic!("{} not found", name),
        }
    }

    fn native(name: &'static str, args: Vec<Value>) -> Value {
        call_native(NativeFn(name), args, &mut NativeOnly).unwrap()
    }

    fn nums(values: &[f64]) -> Value {
        Value::array(values.iter().map(|n| Value::from(*n)).collect())
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(2.0, 2).unwrap(), "2.00");
        assert_eq!(to_fixed(2.5, 0).unwrap(), "3");
        assert_eq!(to_fixed(1.005, 2).unwrap(), "1.00");
        assert_eq!(to_fixed(-1.25, 1).unwrap(), "-1.3");
        assert_eq!(to_fixed(3.14159, 3).unwrap(), "3.142");
        assert!(to_fixed(1.0, 101).is_err());
    }

    #[test]
    fn test_parse_int_and_float() {
        assert_eq!(parse_int("42px", 0), 42.0);
        assert_eq!(parse_int("  -0x1F", 0), -31.0);
        assert_eq!(parse_int("101", 2), 5.0);
        assert!(parse_int("px", 0).is_nan());
        assert_eq!(parse_float("3.25em"), 3.25);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("1e3x"), 1000.0);
        assert_eq!(parse_float("2e"), 2.0);
        assert!(parse_float("abc").is_nan());
    }

    #[test]
    fn test_math() {
        assert_eq!(native("Math.round", vec![Value::from(2.5)]), Value::from(3.0));
        assert_eq!(native("Math.round", vec![Value::from(-2.5)]), Value::from(-2.0));
        assert_eq!(
            native("Math.max", vec![Value::from(1.0), Value::from(7.0), Value::from(3.0)]),
            Value::from(7.0)
        );
        assert_eq!(native("Math.min", vec![]), Value::Number(f64::INFINITY));
        assert_eq!(native("Math.hypot", vec![Value::from(3.0), Value::from(4.0)]), Value::from(5.0));
    }

    #[test]
    fn test_string_methods() {
        let s = Value::from("Hello, World");
        assert_eq!(method(&s, "toUpperCase", vec![]), Value::from("HELLO, WORLD"));
        assert_eq!(method(&s, "slice", vec![Value::from(-5.0)]), Value::from("World"));
        assert_eq!(method(&s, "indexOf", vec![Value::from("o")]), Value::from(4.0));
        assert_eq!(method(&s, "padStart", vec![Value::from(14.0), Value::from("*")]), Value::from("**Hello, World"));
        assert_eq!(
            method(&s, "split", vec![Value::from(", ")]).display(),
            "Hello,World"
        );
        assert_eq!(
            method(&Value::from("a-b-c"), "replaceAll", vec![Value::from("-"), Value::from("+")]),
            Value::from("a+b+c")
        );
        assert_eq!(
            method(&Value::from("a-b-c"), "replace", vec![Value::from("-"), Value::from("+")]),
            Value::from("a+b-c")
        );
    }

    #[test]
    fn test_string_growth_is_bounded() {
        let failure = |receiver: &str, name: &str, args: Vec<Value>| {
            match call_method(&Value::from(receiver), name, args, &mut NativeOnly) {
                BuiltinResult::Err(e) => e.to_string(),
                _ => panic!("{} should fail", name),
            }
        };
        assert!(failure("ab", "repeat", vec![Value::from(1e19)]).contains("invalid string length"));
        assert!(failure("x", "padStart", vec![Value::from(1e10)]).contains("invalid string length"));
        assert!(failure("x", "padEnd", vec![Value::from(1e10), Value::from("ab")]).contains("invalid string length"));

        assert_eq!(method(&Value::from("ab"), "repeat", vec![Value::from(3.0)]), Value::from("ababab"));
        assert_eq!(method(&Value::from(""), "repeat", vec![Value::from(1e19)]), Value::from(""));
        assert_eq!(method(&Value::from("abc"), "padEnd", vec![Value::from(f64::NAN)]), Value::from("abc"));
        assert!(check_string_length(Value::from("short")).is_ok());
    }

    #[test]
    fn test_array_methods() {
        let arr = nums(&[3.0, 1.0, 2.0]);
        assert_eq!(method(&arr, "join", vec![Value::from(" ")]), Value::from("3 1 2"));
        assert_eq!(method(&arr, "push", vec![Value::from(10.0)]), Value::from(4.0));
        assert_eq!(method(&arr, "sort", vec![]).display(), "1,10,2,3");
        assert_eq!(method(&arr, "includes", vec![Value::from(10.0)]), Value::Bool(true));
        assert_eq!(method(&arr, "slice", vec![Value::from(1.0), Value::from(-1.0)]).display(), "10,2");
        let removed = method(&arr, "splice", vec![Value::from(1.0), Value::from(2.0)]);
        assert_eq!(removed.display(), "10,2");
        assert_eq!(arr.display(), "1,3");
        assert_eq!(
            method(&nums(&[1.0]), "concat", vec![nums(&[2.0, 3.0]), Value::from(4.0)]).display(),
            "1,2,3,4"
        );
    }

    #[test]
    fn test_callback_methods_with_natives() {
        let words = Value::array(vec![Value::from("1"), Value::from("2.5")]);
        let parsed = method(&words, "map", vec![Value::Native(NativeFn("parseFloat"))]);
        assert_eq!(parsed.repr(), "[1, 2.5]");
        assert!(matches!(
            call_method(&words, "map", vec![], &mut NativeOnly),
            BuiltinResult::Err(_)
        ));
        assert!(matches!(
            call_method(&words, "frobnicate", vec![], &mut NativeOnly),
            BuiltinResult::NotFound
        ));
    }

    #[test]
    fn test_property_access() {
        assert_eq!(get_property(&Value::from("héllo"), "length").unwrap(), Value::from(5.0));
        assert_eq!(get_property(&Value::from("abc"), "1").unwrap(), Value::from("b"));
        assert_eq!(get_property(&nums(&[1.0]), "5").unwrap(), Value::Undefined);
        assert!(get_property(&Value::Undefined, "x").is_err());

        let arr = nums(&[]);
        set_property(&arr, "2", Value::from(9.0)).unwrap();
        assert_eq!(arr.display(), ",,9");
    }

    #[test]
    fn test_json() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), nums(&[1.0, 2.0]));
        let obj = Value::object(entries);
        assert_eq!(native("JSON.stringify", vec![obj.clone()]), Value::from(r#"{"a":[1,2]}"#));
        assert_eq!(
            native("JSON.stringify", vec![obj, Value::Null, Value::from(2.0)]),
            Value::from("{\n  \"a\": [\n    1,\n    2\n  ]\n}")
        );
        let parsed = native("JSON.parse", vec![Value::from(r#"{"x": [true, null]}"#)]);
        assert_eq!(get_property(&parsed, "x").unwrap().repr(), "[true, null]");
        assert!(call_native(NativeFn("JSON.parse"), vec![Value::from("{")], &mut NativeOnly).is_err());
    }

    #[test]
    fn test_object_functions() {
        let mut entries = IndexMap::new();
        entries.insert("b".to_string(), Value::from(1.0));
        entries.insert("a".to_string(), Value::from(2.0));
        let obj = Value::object(entries);
        assert_eq!(native("Object.keys", vec![obj.clone()]).display(), "b,a");
        assert_eq!(native("Object.entries", vec![obj]).display(), "b,1,a,2");
        assert!(call_native(NativeFn("Object.keys"), vec![Value::Null], &mut NativeOnly).is_err());
    }

    #[test]
    fn test_number_to_string_radix() {
        assert_eq!(to_radix_string(255.0, 16), "ff");
        assert_eq!(to_radix_string(-5.0, 2), "-101");
        assert_eq!(to_radix_string(0.5, 2), "0.1");
    }
}

//! A small JavaScript-flavoured interpreter for declaration and expression
//! blocks.
//!
//! It covers the subset of the language that `.txs` documents use in
//! practice: `const`/`let`/`var`, functions and arrow functions, loops,
//! arrays, objects, template literals and a standard library of `Math`,
//! `JSON`, string, number and array helpers.
//!
//! # Architecture
//!
//! ```text
//! Block source
//!        │
//!        ▼
//!    ┌───────────────┐
//!    │    Lexer      │  (tokens with byte spans)
//!    └───────────────┘
//!        │
//!        ▼
//!    ┌───────────────┐
//!    │    Parser     │  (recursive descent → AST)
//!    └───────────────┘
//!        │
//!        ▼
//!    ┌───────────────┐
//!    │  Interpreter  │  (scopes, closures, built-ins)
//!    └───────────────┘
//!        │
//!        ▼
//!      Value
//! ```
//!
//! # Example
//!
//! ```
//! use plecta::core::script::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.run("const x = 2;").unwrap();
//! let value = interp.eval_expression("x * 2").unwrap();
//! assert_eq!(value.display(), "4");
//! ```

mod ast;
mod eval;
mod lexer;
mod library;
mod ops;
mod parser;
mod scope;
mod token;
mod value;

pub use eval::{BlockError, EvalConfig, Interpreter};
pub use scope::{Scope, Scopes};
pub use value::{
    format_number, ArrayRef, Closure, EvalError, EvalErrorKind, EvalResult, NativeFn, ObjectRef,
    SourceSpan, ValType, Value,
};

//! Core expansion modules
//!
//! - `script`: the interpreter that runs declaration and expression blocks
//! - `expand`: extraction, evaluation and substitution of `.txs` documents

pub mod expand;
pub mod script;

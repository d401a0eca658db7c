//! Macro source parser
//!
//! This module transforms macro source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: Token kinds, keyword table and the arena-backed tree
//!
//! # Language
//!
//! A macro is a whitespace-separated sequence of action names (`click`,
//! `mouseset`, `type`, `keypress`, ...) followed by their string or number
//! arguments. Arguments are siblings of the action in the tree, not children.
//!
//! Blocks:
//! - `loop <count> ... end` repeats its body `count` times
//! - `forever ...` repeats its body indefinitely and runs to end of input
//!
//! # Parser Implementation
//!
//! Block structure is tracked on an explicit stack of open frames instead of
//! the call stack, so deeply nested loops cannot overflow.

pub mod ast;
pub mod lexer;
pub mod parser;

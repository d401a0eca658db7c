//! # Introduction
//!
//! Macroscript is the front end for a line-oriented mouse/keyboard automation
//! language. It turns macro source text into a tree that a runner can walk.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds the AST.
//! 2. [`macros`] — lists the saved macro files in a directory.
//!
//! ## Example
//!
//! ```
//! use macroscript::parser::{ast::TokenKind, parser::parse};
//!
//! let ast = parse("loop 3\n  click \"left\"\nend").unwrap();
//! let block = ast.children(ast.root_id()).next().unwrap();
//! assert_eq!(block.kind, TokenKind::Keyword);
//! assert_eq!(block.value, "loop");
//! ```

pub mod macros;
pub mod parser;

//! AST engine for source parsing and entity extraction.
//!
//! This module provides:
//! - Strict tree-sitter parsing of Python source
//! - Lowering into a typed syntax tree (class / function / other)
//! - Docstring evaluation
//! - Entity extraction into the flat class/method model

pub mod docstring;
pub mod entity_extractor;
pub mod parser;
pub mod syntax;

pub use entity_extractor::{extract, EntityExtractor};
pub use parser::AstParser;
pub use syntax::{ClassNode, FunctionNode, OtherNode, SyntaxNode, SyntaxTree};

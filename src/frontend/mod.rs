//! Source frontend
//!
//! Parses JavaScript-family source with swc. A file's extension picks the
//! grammar; source of unknown origin is tried as JavaScript with JSX first and
//! then as TypeScript, which also covers most Flow annotations.

pub mod dialect;
pub mod parser;
pub mod stack;

pub use dialect::Dialect;
pub use parser::{parse, parse_expression, ParseError, Parsed, MAX_NESTING};
pub use stack::{ensure_sufficient_stack, with_file_stack};

//! Parsing through swc
//!
//! Each candidate grammar of a [`Dialect`] is tried in turn. Before a grammar
//! is handed to the parser, the token stream is checked against
//! [`MAX_NESTING`] so that absurdly nested input fails like any other syntax
//! error instead of exhausting the stack.

use swc_core::common::sync::Lrc;
use swc_core::common::{BytePos, FileName, SourceFile, SourceMap, Span as SourceSpan, Spanned};
use swc_core::ecma::ast::{EsVersion, Expr, Program};
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::token::Token;
use swc_core::ecma::parser::{Parser, StringInput, Syntax};
use thiserror::Error;
use tracing::{debug, trace};

use crate::frontend::dialect::Dialect;
use crate::frontend::stack::with_file_stack;
use crate::util::span::{Position, Span};

/// Deepest bracket nesting accepted in one file
pub const MAX_NESTING: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{message} at {position}")]
    Syntax { message: String, position: Position },

    #[error("Nesting deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

/// A parsed node together with the source map its spans point into
pub struct Parsed<T> {
    node: T,
    source_map: Lrc<SourceMap>,
}

impl<T> Parsed<T> {
    pub fn node(&self) -> &T {
        &self.node
    }

    /// Line and column of `pos`; both 1-indexed
    pub fn position(&self, pos: BytePos) -> Position {
        position(&self.source_map, pos)
    }

    pub fn span(&self, span: SourceSpan) -> Span {
        Span::new(self.position(span.lo), self.position(span.hi))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Parsed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parsed").field("node", &self.node).finish()
    }
}

fn position(
    source_map: &SourceMap,
    pos: BytePos,
) -> Position {
    let loc = source_map.lookup_char_pos(pos);
    let offset = pos.0.saturating_sub(loc.file.start_pos.0) as usize;
    Position::with_offset(loc.line, loc.col.0 + 1, offset)
}

/// Parse a whole file as a script or module, whichever it turns out to be
///
/// # Example
/// ```
/// use errcodes::frontend::{parse, Dialect};
///
/// assert!(parse("invariant(ok, 'Expected %s', name);", Dialect::JavaScript).is_ok());
/// assert!(parse("invariant(ok, ", Dialect::JavaScript).is_err());
/// ```
pub fn parse(
    source: &str,
    dialect: Dialect,
) -> Result<Parsed<Program>, ParseError> {
    parse_with(source, dialect, |parser| parser.parse_program())
}

/// Parse a single expression
pub fn parse_expression(
    source: &str,
    dialect: Dialect,
) -> Result<Parsed<Box<Expr>>, ParseError> {
    parse_with(source, dialect, |parser| parser.parse_expr())
}

fn parse_with<T>(
    source: &str,
    dialect: Dialect,
    run: impl Fn(&mut Parser<Lexer<'_>>) -> swc_core::ecma::parser::PResult<T>,
) -> Result<Parsed<T>, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(FileName::Anon.into(), source.to_string());

    let mut first_error = None;
    for syntax in dialect.syntaxes() {
        check_nesting(&source_map, &file, syntax)?;

        let mut parser = Parser::new(syntax, StringInput::from(&*file), None);
        match with_file_stack(|| run(&mut parser)) {
            Ok(node) => {
                let recovered = parser.take_errors();
                if !recovered.is_empty() {
                    trace!("Parser recovered from {} errors", recovered.len());
                }
                return Ok(Parsed { node, source_map });
            }
            Err(err) => {
                debug!("{:?} parse failed: {}", syntax, err.kind().msg());
                if first_error.is_none() {
                    first_error = Some(ParseError::Syntax {
                        message: err.kind().msg().into_owned(),
                        position: position(&source_map, err.span().lo),
                    });
                }
            }
        }
    }

    Err(first_error.unwrap_or(ParseError::Syntax {
        message: "No grammar to parse with".to_string(),
        position: Position::dummy(),
    }))
}

/// Fail if brackets nest deeper than [`MAX_NESTING`] under `syntax`
fn check_nesting(
    source_map: &SourceMap,
    file: &SourceFile,
    syntax: Syntax,
) -> Result<(), ParseError> {
    let lexer = Lexer::new(syntax, EsVersion::EsNext, StringInput::from(file), None);
    let mut depth = 0usize;

    for token in lexer {
        match token.token {
            Token::LParen | Token::LBracket | Token::LBrace | Token::DollarLBrace => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(ParseError::TooDeep {
                        limit: MAX_NESTING,
                        position: position(source_map, token.span.lo),
                    });
                }
            }
            Token::RParen | Token::RBracket | Token::RBrace => depth = depth.saturating_sub(1),
            // The parser reports lexical errors with better context
            Token::Error(_) => break,
            _ => {}
        }
    }
    Ok(())
}

//! Source dialects and the swc grammars they map to

use std::path::Path;
use swc_core::ecma::parser::{EsSyntax, Syntax, TsSyntax};

/// Language a file is written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `.js`, `.jsx`, `.mjs`, `.cjs` and source of unknown origin.
    ///
    /// Tried as JavaScript with JSX, then as TSX, then as TypeScript, so that
    /// Flow annotations and generic arrows still parse.
    #[default]
    JavaScript,
    /// `.ts`, `.mts`, `.cts`; no JSX, so `<T>(x) => x` and `<T>x` parse
    TypeScript,
    /// `.tsx`
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Dialect {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts") => Dialect::TypeScript,
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    /// Grammars to try, in order; the first that parses wins
    pub fn syntaxes(self) -> Vec<Syntax> {
        match self {
            Dialect::JavaScript => vec![es(), typescript(true), typescript(false)],
            Dialect::TypeScript => vec![typescript(false)],
            Dialect::Tsx => vec![typescript(true)],
        }
    }
}

fn es() -> Syntax {
    Syntax::Es(EsSyntax {
        jsx: true,
        decorators: true,
        decorators_before_export: true,
        ..Default::default()
    })
}

fn typescript(tsx: bool) -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx,
        decorators: true,
        ..Default::default()
    })
}

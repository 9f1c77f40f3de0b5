//! Assertion call-site scanner
//!
//! Finds `invariant(condition, message, ...args)` calls in a module, folds each
//! message and records it in the code map. A file is scanned in two passes:
//! every message is folded first, and the map is only touched once the whole
//! file is known to be good.

use indexmap::IndexMap;
use std::collections::HashSet;
use swc_core::common::{Span as SourceSpan, Spanned};
use swc_core::ecma::ast::{CallExpr, Callee, Expr, ExprOrSpread, Program};
use swc_core::ecma::visit::{Visit, VisitWith};
use tracing::debug;

use crate::extract::alloc::IdAllocator;
use crate::extract::error::{EvalError, ScanError, StoreError};
use crate::extract::eval::{eval_argument, UnfoldablePolicy};
use crate::extract::store::{CodeMap, InvertedIndex};
use crate::frontend::{ensure_sufficient_stack, parse, with_file_stack, Dialect, Parsed};
use crate::util::span::Span;

/// Default name of the assertion function
pub const DEFAULT_ASSERTION_NAME: &str = "invariant";

/// Message argument of `expr` if it is an assertion call.
///
/// Matches a call whose callee is the plain identifier `name` with at least
/// two arguments. Optional calls and `new` are different node kinds and never
/// match; type arguments on the call do not matter.
pub fn assertion_message<'e>(
    expr: &'e Expr,
    name: &str,
) -> Option<&'e ExprOrSpread> {
    match expr {
        Expr::Call(CallExpr {
            callee: Callee::Expr(callee),
            args,
            ..
        }) if args.len() >= 2 => match &**callee {
            Expr::Ident(ident) if &*ident.sym == name => args.get(1),
            _ => None,
        },
        _ => None,
    }
}

/// How call sites are recognized and folded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub assertion_name: String,
    pub policy: UnfoldablePolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            assertion_name: DEFAULT_ASSERTION_NAME.to_string(),
            policy: UnfoldablePolicy::default(),
        }
    }
}

/// A matched assertion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub id: u32,
    pub message: String,
    pub span: Span,
}

/// Result of scanning one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Every matched call, in traversal order
    pub sites: Vec<CallSite>,
    /// Messages that received a new code, in discovery order
    pub allocated: IndexMap<String, u32>,
}

/// Code map plus the lookup state needed to extend it
#[derive(Debug, Clone)]
pub struct ScanContext {
    map: CodeMap,
    index: InvertedIndex,
    alloc: IdAllocator,
}

impl ScanContext {
    /// Fails if `map` assigns the same message to two codes
    pub fn new(map: CodeMap) -> Result<Self, StoreError> {
        let index = map.invert()?;
        let alloc = IdAllocator::from_ids(map.ids());
        Ok(Self { map, index, alloc })
    }

    pub fn map(&self) -> &CodeMap {
        &self.map
    }

    pub fn into_map(self) -> CodeMap {
        self.map
    }

    pub fn lookup(
        &self,
        message: &str,
    ) -> Option<u32> {
        self.index.get(message)
    }

    /// Code for `message`, allocating one if the message is new
    pub fn record(
        &mut self,
        message: &str,
    ) -> Result<u32, StoreError> {
        if let Some(id) = self.index.get(message) {
            return Ok(id);
        }
        let id = self.alloc.allocate()?;
        self.map.insert(id, message);
        self.index.insert(message, id);
        Ok(id)
    }

    /// Parse and scan one file. On error the map is unchanged.
    pub fn scan_source(
        &mut self,
        source: &str,
        dialect: Dialect,
        options: &ScanOptions,
    ) -> Result<ScanReport, ScanError> {
        // The AST is dropped on the file stack too
        let found = with_file_stack(|| {
            let parsed = parse(source, dialect)?;
            collect(&parsed, options)
        })?;
        self.commit(found)
    }

    /// Scan an already parsed file
    pub fn scan_program(
        &mut self,
        parsed: &Parsed<Program>,
        options: &ScanOptions,
    ) -> Result<ScanReport, ScanError> {
        let found = collect(parsed, options)?;
        self.commit(found)
    }

    fn commit(
        &mut self,
        found: Vec<(String, Span)>,
    ) -> Result<ScanReport, ScanError> {
        let new_messages = found
            .iter()
            .filter(|(message, _)| self.index.get(message).is_none())
            .map(|(message, _)| message.as_str())
            .collect::<HashSet<_>>()
            .len();
        if new_messages as u64 > self.alloc.remaining() {
            return Err(StoreError::IdOverflow.into());
        }

        let mut report = ScanReport::default();
        for (message, span) in found {
            let id = match self.index.get(&message) {
                Some(id) => id,
                None => {
                    let id = self.record(&message)?;
                    report.allocated.insert(message.clone(), id);
                    id
                }
            };
            report.sites.push(CallSite { id, message, span });
        }

        debug!(
            "Matched {} call sites, {} new codes",
            report.sites.len(),
            report.allocated.len()
        );
        Ok(report)
    }
}

/// Fold every assertion message of `parsed`, in pre-order
fn collect(
    parsed: &Parsed<Program>,
    options: &ScanOptions,
) -> Result<Vec<(String, Span)>, ScanError> {
    let mut collector = Collector {
        name: &options.assertion_name,
        policy: options.policy,
        found: Vec::new(),
        error: None,
    };
    parsed.node().visit_with(&mut collector);

    if let Some(source) = collector.error {
        let position = parsed.position(source.span().lo);
        return Err(ScanError::Eval { source, position });
    }
    Ok(collector
        .found
        .into_iter()
        .map(|(message, span)| (message, parsed.span(span)))
        .collect())
}

/// Folds the message of every assertion call, stopping at the first failure
struct Collector<'o> {
    name: &'o str,
    policy: UnfoldablePolicy,
    found: Vec<(String, SourceSpan)>,
    error: Option<EvalError>,
}

impl Visit for Collector<'_> {
    fn visit_expr(
        &mut self,
        expr: &Expr,
    ) {
        if self.error.is_some() {
            return;
        }
        if let Some(message) = assertion_message(expr, self.name) {
            match eval_argument(message, self.policy) {
                Ok(message) => self.found.push((message, expr.span())),
                Err(error) => {
                    self.error = Some(error);
                    return;
                }
            }
        }
        // Children after the node itself: outer calls come first
        ensure_sufficient_stack(|| expr.visit_children_with(self));
    }
}

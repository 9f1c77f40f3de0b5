//! Partial evaluator for assertion messages
//!
//! Folds a message expression into a string. String literals, `+`
//! concatenation and template literals fold; every other shape is replaced by
//! [`PLACEHOLDER`] (or rejected, see [`UnfoldablePolicy`]).

use serde::{Deserialize, Serialize};
use swc_core::common::Spanned;
use swc_core::ecma::ast::{
    BinExpr, BinaryOp, Expr, ExprOrSpread, Lit, ParenExpr, Str, Tpl, TsAsExpr, TsConstAssertion,
    TsNonNullExpr, TsSatisfiesExpr, TsTypeAssertion,
};

use crate::extract::error::EvalError;
use crate::frontend::stack::ensure_sufficient_stack;

/// Marker that stands in for a segment whose value is only known at runtime
pub const PLACEHOLDER: &str = "%s";

/// What to do with a message segment that cannot be folded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnfoldablePolicy {
    /// Substitute [`PLACEHOLDER`]
    #[default]
    Placeholder,
    /// Fail the call site, and with it the file being scanned
    Reject,
}

/// Shape of a message expression, as far as folding is concerned
#[derive(Debug, Clone, Copy)]
pub enum MessagePart<'a> {
    Literal(&'a str),
    Concat(&'a Expr, &'a Expr),
    /// Untagged template literal; tagged ones are [`MessagePart::Unknown`]
    Template(&'a Tpl),
    /// Parentheses and type assertions do not change the value
    Transparent(&'a Expr),
    Unknown(&'a Expr),
}

impl<'a> MessagePart<'a> {
    pub fn classify(expr: &'a Expr) -> Self {
        match expr {
            Expr::Lit(Lit::Str(Str { value, .. })) => MessagePart::Literal(value),
            Expr::Bin(BinExpr {
                op: BinaryOp::Add,
                left,
                right,
                ..
            }) => MessagePart::Concat(left, right),
            Expr::Tpl(tpl) => MessagePart::Template(tpl),
            Expr::Paren(ParenExpr { expr, .. })
            | Expr::TsAs(TsAsExpr { expr, .. })
            | Expr::TsTypeAssertion(TsTypeAssertion { expr, .. })
            | Expr::TsConstAssertion(TsConstAssertion { expr, .. })
            | Expr::TsNonNull(TsNonNullExpr { expr, .. })
            | Expr::TsSatisfies(TsSatisfiesExpr { expr, .. }) => MessagePart::Transparent(expr),
            other => MessagePart::Unknown(other),
        }
    }
}

/// Fold `expr`, substituting [`PLACEHOLDER`] for anything unknown. Never fails.
pub fn eval_to_string(expr: &Expr) -> String {
    let mut folder = Folder {
        out: String::new(),
        policy: UnfoldablePolicy::Placeholder,
    };
    match folder.fold(expr) {
        Ok(()) => folder.out,
        Err(_) => PLACEHOLDER.to_string(),
    }
}

/// Fold `expr` under `policy`
pub fn eval_with_policy(
    expr: &Expr,
    policy: UnfoldablePolicy,
) -> Result<String, EvalError> {
    let mut folder = Folder {
        out: String::new(),
        policy,
    };
    folder.fold(expr)?;
    Ok(folder.out)
}

/// Fold a call argument. A spread argument has no single value.
pub fn eval_argument(
    arg: &ExprOrSpread,
    policy: UnfoldablePolicy,
) -> Result<String, EvalError> {
    match arg.spread {
        None => eval_with_policy(&arg.expr, policy),
        Some(spread) => {
            let mut folder = Folder {
                out: String::new(),
                policy,
            };
            folder.unknown("spread argument", spread)?;
            Ok(folder.out)
        }
    }
}

struct Folder {
    out: String,
    policy: UnfoldablePolicy,
}

impl Folder {
    fn fold(
        &mut self,
        expr: &Expr,
    ) -> Result<(), EvalError> {
        ensure_sufficient_stack(|| self.fold_part(expr))
    }

    fn fold_part(
        &mut self,
        expr: &Expr,
    ) -> Result<(), EvalError> {
        match MessagePart::classify(expr) {
            MessagePart::Literal(value) => self.out.push_str(value),
            MessagePart::Concat(left, right) => {
                self.fold(left)?;
                self.fold(right)?;
            }
            MessagePart::Template(tpl) => {
                for (index, quasi) in tpl.quasis.iter().enumerate() {
                    // Cooking fails on invalid escapes; the raw text is all there is then
                    self.out.push_str(quasi.cooked.as_deref().unwrap_or(&*quasi.raw));
                    if let Some(expr) = tpl.exprs.get(index) {
                        self.fold(expr)?;
                    }
                }
            }
            MessagePart::Transparent(inner) => self.fold(inner)?,
            MessagePart::Unknown(expr) => self.unknown(shape_name(expr), expr.span())?,
        }
        Ok(())
    }

    fn unknown(
        &mut self,
        kind: &'static str,
        span: swc_core::common::Span,
    ) -> Result<(), EvalError> {
        match self.policy {
            UnfoldablePolicy::Placeholder => {
                self.out.push_str(PLACEHOLDER);
                Ok(())
            }
            UnfoldablePolicy::Reject => Err(EvalError::Unfoldable { kind, span }),
        }
    }
}

/// Human-readable name of an expression shape, for diagnostics
fn shape_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::Ident(..) => "identifier",
        Expr::Lit(..) => "non-string literal",
        Expr::TaggedTpl(..) => "tagged template",
        Expr::Call(..) => "call",
        Expr::New(..) => "constructor call",
        Expr::Member(..) | Expr::OptChain(..) => "member access",
        Expr::Bin(..) => "binary expression",
        Expr::Cond(..) => "conditional expression",
        Expr::Unary(..) => "unary expression",
        Expr::Arrow(..) | Expr::Fn(..) => "function",
        _ => "expression",
    }
}

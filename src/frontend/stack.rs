//! Stack safety for deeply nested source.
//!
//! The parser and the AST walks recurse once per nesting level, so a
//! pathological file must not be able to exhaust the thread's stack.

const RED_ZONE: usize = 100 * 1024; // 100KB
const STACK_PER_RECURSION: usize = 1024 * 1024; // 1MB

/// Stack segment one file is parsed and walked on (64MB, committed lazily)
const FILE_STACK: usize = 64 * 1024 * 1024;

/// Ensure sufficient stack space for recursive operations.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Run `f` on a fresh stack segment sized for one file.
///
/// Used around code we cannot instrument, such as the swc parser and the
/// drop of a deep AST.
pub fn with_file_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::grow(FILE_STACK, f)
}

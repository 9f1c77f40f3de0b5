//! Error code extraction
//!
//! Scans source for assertion calls, gives every distinct message a stable
//! numeric code and keeps the code map on disk. Codes are only ever appended.

pub mod alloc;
pub mod decode;
pub mod emitter;
pub mod error;
pub mod eval;
pub mod plugin;
pub mod scanner;
pub mod session;
pub mod store;

pub use alloc::{next_id, IdAllocator};
pub use decode::{decode, decoder_url_for, encode_uri_component, format_message, minified_message};
pub use emitter::{emit_modules, DEFAULT_DECODER_URL, DEV_MODULE, PROD_MODULE};
pub use error::{EvalError, ExtractError, ExtractResult, ScanError, StoreError};
pub use eval::{eval_argument, eval_to_string, eval_with_policy, UnfoldablePolicy, PLACEHOLDER};
pub use plugin::{ErrorExtraction, TransformOutput};
pub use scanner::{assertion_message, CallSite, ScanContext, ScanOptions, ScanReport};
pub use session::{ExtractOptions, ExtractSession, SessionPhase};
pub use store::{CodeMap, InvertedIndex};

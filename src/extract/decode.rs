//! Decoding minified errors
//!
//! The counterpart of the production constructor: builds the same decoder
//! URLs and expands a code back into its full message.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::extract::eval::PLACEHOLDER;
use crate::extract::store::CodeMap;

/// Characters `encodeURIComponent` escapes: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `value` the way JavaScript's `encodeURIComponent` does
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decoder URL for `code`, with one `args[]` parameter per argument
pub fn decoder_url_for<S: AsRef<str>>(
    decoder_url: &str,
    code: u32,
    args: &[S],
) -> String {
    let mut url = format!("{}{}", decoder_url, code);
    for arg in args {
        url.push_str("&args[]=");
        url.push_str(&encode_uri_component(arg.as_ref()));
    }
    url
}

/// Message of the error thrown by the production constructor
pub fn minified_message<S: AsRef<str>>(
    decoder_url: &str,
    code: u32,
    args: &[S],
) -> String {
    format!(
        "Minified error #{}; visit {} for the full message or use the non-minified dev \
         environment for full errors and additional helpful warnings. ",
        code,
        decoder_url_for(decoder_url, code, args)
    )
}

/// Substitute `args` for the placeholders of `template`, in order.
/// Placeholders without an argument are kept.
pub fn format_message<S: AsRef<str>>(
    template: &str,
    args: &[S],
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(at) = rest.find(PLACEHOLDER) {
        out.push_str(&rest[..at]);
        match args.next() {
            Some(arg) => out.push_str(arg.as_ref()),
            None => out.push_str(PLACEHOLDER),
        }
        rest = &rest[at + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

/// Full message for `code`, or `None` if the map has no such code
pub fn decode<S: AsRef<str>>(
    map: &CodeMap,
    code: u32,
    args: &[S],
) -> Option<String> {
    map.get(code).map(|template| format_message(template, args))
}

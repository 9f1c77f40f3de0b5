//! Generated error constructor modules
//!
//! Two modules are written next to each other on every flush:
//! `ErrorDev.js` builds an error carrying the full message, and
//! `ErrorProd.js` builds a short error that points at the decoder page.

use std::path::Path;
use tracing::debug;

use crate::extract::error::{ExtractError, ExtractResult};

pub const DEV_MODULE: &str = "ErrorDev.js";
pub const PROD_MODULE: &str = "ErrorProd.js";

/// `name` of errors built by the development constructor
pub const DEV_ERROR_NAME: &str = "Invariant Violation";

/// Decoder page; the code is appended to it
pub const DEFAULT_DECODER_URL: &str = "https://reactjs.org/docs/error-decoder.html?invariant=";

pub fn dev_module_source() -> String {
    format!(
        r#"function ErrorDev(message) {{
  const error = new Error(message);
  error.name = {name};
  return error;
}}

export default ErrorDev;
"#,
        name = js_string(DEV_ERROR_NAME),
    )
}

pub fn prod_module_source(decoder_url: &str) -> String {
    format!(
        r#"function ErrorProd(code) {{
  let url = {url} + code;
  for (let i = 1; i < arguments.length; i++) {{
    url += '&args[]=' + encodeURIComponent(arguments[i]);
  }}
  return new Error(
    `Minified error #${{code}}; visit ${{url}} for the full message or ` +
      'use the non-minified dev environment for full errors and additional ' +
      'helpful warnings. '
  );
}}

export default ErrorProd;
"#,
        url = js_string(decoder_url),
    )
}

/// Quote `value` as a JavaScript string literal
fn js_string(value: &str) -> String {
    // JSON strings are valid JavaScript string literals
    serde_json::Value::from(value).to_string()
}

/// Write both modules into `dir`, creating it if needed
pub async fn emit_modules(
    dir: &Path,
    decoder_url: &str,
) -> ExtractResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ExtractError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    for (name, text) in [
        (DEV_MODULE, dev_module_source()),
        (PROD_MODULE, prod_module_source(decoder_url)),
    ] {
        let path = dir.join(name);
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| ExtractError::Io { path: path.clone(), source })?;
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

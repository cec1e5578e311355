//! Request body serialization helpers.
//!
//! Data entries are rendered either as multipart form fields (when the
//! transport supports form encoding) or as a percent-encoded query string.
//! Scalar JSON values render without quoting, so `"x y"` becomes `x y` and
//! `1` becomes `1`; composite values fall back to their compact JSON text.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left literal in addition to alphanumerics. Everything else is
/// percent-encoded, so a space renders as `%20`.
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

/// Render a data value as its plain string form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build a percent-encoded `key=value&key=value` body, preserving entry
/// order.
pub fn encode_query(data: &[(String, Value)]) -> String {
    encode_pairs(&form_entries(data))
}

/// Percent-encode already-rendered string pairs into a query body.
pub(crate) fn encode_pairs(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&utf8_percent_encode(key, COMPONENT).to_string());
        out.push('=');
        out.push_str(&utf8_percent_encode(value, COMPONENT).to_string());
    }
    out
}

/// Render data entries as multipart form fields, preserving entry order.
pub fn form_entries(data: &[(String, Value)]) -> Vec<(String, String)> {
    data.iter()
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect()
}

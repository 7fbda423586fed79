//! Environment-variable expansion for decoded documents.

use serde_json::Value;
use tracing::debug;

/// Expand `$VAR` and `${VAR}` references in every string value of a document.
///
/// Unset variables expand to the empty string. Non-string values (numbers,
/// booleans, nulls) are left untouched; arrays and objects are walked
/// recursively.
pub(crate) fn expand_document(document: &mut Value) {
    match document {
        Value::String(value) => {
            let expanded = expand_str(value);
            if expanded != *value {
                debug!(from = %value, to = %expanded, "expanded environment reference");
                *value = expanded;
            }
        }
        Value::Array(items) => {
            for item in items {
                expand_document(item);
            }
        }
        Value::Object(map) => {
            for value in map.values_mut() {
                expand_document(value);
            }
        }
        _ => {}
    }
}

/// Expand environment references in a single string.
///
/// Variable names are ASCII alphanumerics and underscores; a `$` followed by
/// anything else (or an unterminated `${`) is kept literally.
fn expand_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => {
                    out.push_str(&lookup(&braced[..end]));
                    rest = &braced[end + 1..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
            continue;
        }
        let name_len = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .count();
        if name_len == 0 {
            out.push('$');
            rest = after;
            continue;
        }
        out.push_str(&lookup(&after[..name_len]));
        rest = &after[name_len..];
    }
    out.push_str(rest);
    out
}

fn lookup(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    std::env::var(name).unwrap_or_default()
}

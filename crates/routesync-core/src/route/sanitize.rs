//! Escaping for values placed into router API words

/// Escape every `=` as `\=` so the value cannot split an `=key=value` word
///
/// Nothing else is touched. The function is not idempotent: running it on an
/// already escaped string escapes again.
pub fn sanitize_domain(value: &str) -> String {
    value.replace('=', "\\=")
}

//! Bounding and serializing arbitrary data for inclusion in log records.

use serde_json::Value;

/// Default cap on a redacted field, in characters.
pub const DEFAULT_MAX_LEN: usize = 200;

/// Placeholder for empty or absent data.
pub const ABSENT: &str = "N/A";

const ELLIPSIS: &str = "...";

/// Keep at most `max_len` characters of `text`, marking the cut with "...".
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Field-level redaction with a fixed length cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redactor {
    max_len: usize,
}

impl Redactor {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Redact text; `None` and "" become the placeholder.
    pub fn text(&self, text: Option<&str>) -> String {
        match text {
            None | Some("") => ABSENT.to_string(),
            Some(text) => truncate(text, self.max_len),
        }
    }

    /// Redact a JSON value. Strings are kept as-is, everything else is
    /// serialized first; null and "" become the placeholder.
    pub fn value(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => ABSENT.to_string(),
            Some(Value::String(text)) => self.text(Some(text)),
            Some(other) => truncate(&other.to_string(), self.max_len),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_absent() {
        let redactor = Redactor::new(5);
        assert_eq!(redactor.text(Some("")), "N/A");
        assert_eq!(redactor.text(None), "N/A");
        assert_eq!(redactor.value(None), "N/A");
        assert_eq!(redactor.value(Some(&Value::Null)), "N/A");
        assert_eq!(redactor.value(Some(&json!(""))), "N/A");
    }

    #[test]
    fn test_truncates_long_text() {
        let long = "x".repeat(250);
        let redacted = Redactor::default().text(Some(&long));
        assert!(redacted.ends_with("..."));
        assert_eq!(redacted.len(), 203);
        assert_eq!(&redacted[..200], &long[..200]);
    }

    #[test]
    fn test_exact_length_is_kept() {
        let exact = "y".repeat(200);
        assert_eq!(Redactor::default().text(Some(&exact)), exact);
    }

    #[test]
    fn test_serializes_non_strings() {
        let redactor = Redactor::default();
        assert_eq!(redactor.value(Some(&json!({"email": "d@jwt.com"}))), r#"{"email":"d@jwt.com"}"#);
        assert_eq!(redactor.value(Some(&json!(42))), "42");
        assert_eq!(redactor.value(Some(&json!("plain"))), "plain");
    }

    #[test]
    fn test_multibyte_is_cut_on_char_boundary() {
        assert_eq!(truncate("常用名字", 2), "常用...");
    }
}

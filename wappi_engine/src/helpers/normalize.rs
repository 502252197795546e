use serde_json::Value;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Folds case and accents so that `"Descripción"` and `"descripcion"` compare equal.
///
/// The string is lowercased, decomposed (NFD), stripped of combining marks and recomposed (NFC).
pub fn normalize(s: &str) -> String {
    s.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Renders a spreadsheet cell as trimmed text. Non-breaking spaces are treated as ordinary whitespace.
pub fn clean_cell(value: &Value) -> String {
    let raw = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace('\u{a0}', " ").trim().to_string()
}

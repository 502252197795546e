use log::trace;

use super::{clean_cell, normalize};
use crate::db_types::ImportData;

/// Header fragments that identify the product-name column.
pub const NAME_PATTERNS: [&str; 5] = ["descripcion", "nombre", "name", "producto", "description"];
/// Header fragments that identify the unit-price column.
pub const PRICE_PATTERNS: [&str; 6] = ["precio unitario", "precio", "price", "costo", "valor", "importe"];
/// Header fragments that identify the product-code column.
pub const CODE_PATTERNS: [&str; 5] = ["codigo", "code", "sku", "ref", "referencia"];

/// Returns the cleaned value of the first column whose normalized header contains any of the normalized `patterns`.
///
/// Headers are visited in their sorted order, so the result is deterministic when several headers qualify.
pub fn find_value(record: &ImportData, patterns: &[&str]) -> Option<String> {
    let patterns = patterns.iter().map(|p| normalize(p)).collect::<Vec<_>>();
    record.iter().find_map(|(key, value)| {
        let key = normalize(key);
        patterns.iter().any(|p| key.contains(p.as_str())).then(|| {
            trace!("🏷️ Column '{key}' matched");
            clean_cell(value)
        })
    })
}

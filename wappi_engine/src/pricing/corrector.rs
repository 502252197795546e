use log::{debug, warn};

use super::match_import;
use crate::{
    db_types::{ImportRecord, OrderItem},
    helpers::{find_value, NAME_PATTERNS, PRICE_PATTERNS},
};

/// Parses a price cell such as `"$ 1234,50"`, rounding to the nearest whole unit.
///
/// Currency signs and spaces are dropped and every comma is read as a decimal point. A value that uses thousands
/// separators (`"$ 1.234,50"`) therefore does not parse.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.chars().filter(|c| !matches!(c, '$' | ' ' | '\u{a0}')).collect::<String>().replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v.round()),
        Ok(v) => {
            warn!("🏷️ Ignoring non-finite price '{raw}' ({v})");
            None
        },
        Err(e) => {
            warn!("🏷️ Could not read '{raw}' as a price. {e}");
            None
        },
    }
}

/// Rewrites item names and prices from the import records they match.
///
/// Each item is handled independently and keeps its position. The returned flag is true if at least one name or price
/// was changed. Items without a match, or whose matched row carries an unreadable price, are kept as they are.
pub fn correct_prices(items: &[OrderItem], records: &[ImportRecord]) -> (Vec<OrderItem>, bool) {
    let mut changed = false;
    let corrected = items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            let Some(record) = match_import(&item, records) else {
                debug!("🏷️ No price list entry for '{}'", item.name);
                return item;
            };
            if let Some(name) = find_value(&record.data, &NAME_PATTERNS).filter(|n| !n.is_empty() && *n != item.name) {
                debug!("🏷️ Renaming '{}' to '{name}'", item.name);
                item.name = name;
                changed = true;
            }
            if let Some(price) = find_value(&record.data, &PRICE_PATTERNS).and_then(|p| parse_price(&p)) {
                if price != item.price {
                    debug!("🏷️ Repricing '{}' from {} to {price}", item.name, item.price);
                    item.price = price;
                    changed = true;
                }
            }
            item
        })
        .collect();
    (corrected, changed)
}

use log::trace;

use crate::{
    db_types::{ImportRecord, OrderItem},
    helpers::{find_value, normalize, CODE_PATTERNS, NAME_PATTERNS},
};

/// Finds the import record that `item` refers to.
///
/// 1. If the item carries a code, the first record whose code column normalizes to the same value wins.
/// 2. Otherwise, or if no code matched, the item name is compared with each record's name column: first looking for an
///    exact (normalized) match over all records, then for a record whose name contains the item name, or vice versa.
///
/// Ties go to the earliest record in `records`. Records with a blank name column never match by name, and neither do
/// items with a blank name. A plain substring test would let a blank-name row match every item, since the empty string
/// is contained in any name; that behaviour is deliberately not reproduced.
pub fn match_import<'a>(item: &OrderItem, records: &'a [ImportRecord]) -> Option<&'a ImportRecord> {
    if let Some(code) = item.code() {
        let code = normalize(code);
        let hit = records.iter().find(|r| find_value(&r.data, &CODE_PATTERNS).is_some_and(|c| normalize(&c) == code));
        if let Some(record) = hit {
            trace!("🏷️ '{}' matched import {} by code", item.name, record.id);
            return Some(record);
        }
    }
    let name = normalize(item.name.trim());
    if name.is_empty() {
        return None;
    }
    let named = records
        .iter()
        .filter_map(|r| find_value(&r.data, &NAME_PATTERNS).map(|n| (r, normalize(&n))))
        .filter(|(_, n)| !n.is_empty())
        .collect::<Vec<_>>();
    let exact = named.iter().find(|(_, n)| *n == name);
    let hit = exact.or_else(|| named.iter().find(|(_, n)| n.contains(&name) || name.contains(n.as_str())));
    if let Some((record, _)) = hit {
        trace!("🏷️ '{}' matched import {} by name", item.name, record.id);
    }
    hit.map(|(record, _)| *record)
}

//! Text helpers used when reading spreadsheet-sourced data.
mod column_extractor;
mod normalize;

pub use column_extractor::{find_value, CODE_PATTERNS, NAME_PATTERNS, PRICE_PATTERNS};
pub use normalize::{clean_cell, normalize};

//! SQLite storage backend for the Wappi engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

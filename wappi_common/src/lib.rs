//! Small helpers shared by the Wappi engine and server crates.
mod helpers;
mod secret;

pub use helpers::{parse_boolean_flag, parse_env_or_default};
pub use secret::Secret;

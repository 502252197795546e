use std::{fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse an optional raw value into `T`. Missing values yield the default. Unparseable values also yield the default,
/// and the parse error is handed back so that the caller can report it.
pub fn parse_env_or_default<T>(value: Option<String>, default: T) -> (T, Option<String>)
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => (default, None),
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) => (v, None),
            Err(e) => (default, Some(format!("'{s}' is not valid: {e}"))),
        },
    }
}

//! Environment variable lookup and coercion helpers.
//!
//! Every reader takes a lookup closure instead of calling `std::env`
//! directly, so configuration and event collection can be driven from
//! a plain map in tests.

use crate::error::ConfigError;

/// Returns the value of `var` or `default` when it is unset.
///
/// A variable that is set to the empty string is kept as-is, it is only
/// replaced when absent.
pub fn var_or<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).unwrap_or_else(|| default.to_string())
}

/// Case-insensitive boolean flag: only the literal `true` enables it.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parses a TCP port, reporting the offending variable on failure.
pub fn parse_port(var: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Lookup closure backed by the real process environment.
///
/// Variables holding invalid UTF-8 are treated as unset.
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

//! Environment override helpers
//!
//! Every tunable in tradex can be overridden from the environment. These
//! helpers keep the "unset", "blank" and "malformed" cases distinct so
//! configuration loaders can fall back or fail as appropriate.

use std::str::FromStr;
use thiserror::Error;

/// A set but unparseable environment variable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {name}: {reason}")]
pub struct EnvError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

/// Read an environment variable, treating blank values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name).map(|raw| parse_value(name, &raw)).transpose()
}

/// Read a boolean environment variable (`1/0`, `true/false`, `yes/no`, `on/off`)
pub fn env_flag(name: &str) -> Result<Option<bool>, EnvError> {
    env_var(name).map(|raw| parse_flag(name, &raw)).transpose()
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| EnvError {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, EnvError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EnvError {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("N", "3000"), Ok(3000));

        let err = parse_value::<u64>("TRADEX_POLL_INTERVAL_MS", "soon").unwrap_err();
        assert_eq!(err.name, "TRADEX_POLL_INTERVAL_MS");
        assert_eq!(err.value, "soon");
        assert!(err.to_string().starts_with("invalid value 'soon'"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("F", "YES"), Ok(true));
        assert_eq!(parse_flag("F", "off"), Ok(false));
        assert!(parse_flag("F", "maybe").is_err());
    }

    #[test]
    fn test_unset_variable_is_none() {
        let name = "TRADEX_UTILS_TEST_SURELY_UNSET_VARIABLE";
        assert_eq!(env_var(name), None);
        assert_eq!(env_parse::<u32>(name), Ok(None));
        assert_eq!(env_flag(name), Ok(None));
    }
}

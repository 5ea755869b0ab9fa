//! Configuration utility functions
//!
//! Helpers for reading optional overrides from environment variables.
//! Unparseable values fall back to the default.

use std::path::PathBuf;

/// Get a path value from an environment variable, if set and non-empty
pub fn get_env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|val| !val.is_empty())
        .map(PathBuf::from)
}

/// Get a u64 value from an environment variable or use the default
pub fn get_env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get a f64 value from an environment variable or use the default
pub fn get_env_f64(key: &str, default: f64) -> f64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

//! Configuration management and environment variable loading

use crate::{MapMemError, Result};
use std::env;

/// Load environment variables from .env file
///
/// This function loads variables from a .env file in the current directory
/// or a parent directory. It's safe to call multiple times (only loads once).
///
/// # Example
///
/// ```no_run
/// use mapmem_core::load_env;
///
/// // Load .env file
/// load_env().ok();
///
/// // Now you can use environment variables
/// let api_key = std::env::var("PINECONE_API_KEY").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::info!("✓ Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(MapMemError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::warn!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(MapMemError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Get required environment variable
///
/// Returns an error if the variable is not set
pub fn get_required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| {
        MapMemError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            key
        ))
    })
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_required_env() {
        env::set_var("MAPMEM_TEST_REQUIRED", "value");
        assert_eq!(get_required_env("MAPMEM_TEST_REQUIRED").unwrap(), "value");
        env::remove_var("MAPMEM_TEST_REQUIRED");

        let err = get_required_env("MAPMEM_TEST_MISSING").unwrap_err();
        assert!(err.to_string().contains("MAPMEM_TEST_MISSING"));
    }

    #[test]
    fn test_get_env_int() {
        env::set_var("MAPMEM_TEST_INT", "1024");
        assert_eq!(get_env_int("MAPMEM_TEST_INT", 0usize), 1024);
        assert_eq!(get_env_int("MAPMEM_TEST_NONEXISTENT", 99usize), 99);
        env::remove_var("MAPMEM_TEST_INT");
    }

    #[test]
    fn test_get_env_or() {
        env::set_var("MAPMEM_TEST_STRING", "hello");
        assert_eq!(get_env_or("MAPMEM_TEST_STRING", "default"), "hello");
        assert_eq!(get_env_or("MAPMEM_TEST_NONEXISTENT", "default"), "default");
        env::remove_var("MAPMEM_TEST_STRING");
    }
}

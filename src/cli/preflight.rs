//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials and inputs are available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{DelveError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Research needs model and search credentials.
    Research,
    /// Batch needs credentials and a readable input file.
    Batch { input: &'a Path },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    check_api_key(&settings.model.api_key_env, "model")?;
    check_api_key(&settings.search.api_key_env, "search")?;

    if let Operation::Batch { input } = operation {
        if !input.is_file() {
            return Err(DelveError::InvalidInput(format!(
                "Batch input file not found: {}",
                input.display()
            )));
        }
    }
    Ok(())
}

/// Check that the environment variable holding an API key is set.
fn check_api_key(var: &str, service: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(DelveError::Config(format!(
            "{} is empty ({} API key). Set it with: export {}='...'",
            var, service, var
        ))),
        Err(_) => Err(DelveError::Config(format!(
            "{} not set ({} API key). Set it with: export {}='...'",
            var, service, var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_env(model_var: &str, search_var: &str) -> Settings {
        let mut settings = Settings::default();
        settings.model.api_key_env = model_var.to_string();
        settings.search.api_key_env = search_var.to_string();
        settings
    }

    #[test]
    fn test_missing_key_is_reported_by_name() {
        let settings = settings_with_env("DELVE_TEST_PREFLIGHT_UNSET_MODEL", "PATH");
        let err = check(Operation::Research, &settings).unwrap_err();
        assert!(err.to_string().contains("DELVE_TEST_PREFLIGHT_UNSET_MODEL"));
    }

    #[test]
    fn test_batch_requires_input_file() {
        // PATH is set in any test environment.
        let settings = settings_with_env("PATH", "PATH");
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("query.jsonl");
        assert!(matches!(
            check(Operation::Batch { input: &missing }, &settings),
            Err(DelveError::InvalidInput(_))
        ));

        std::fs::write(&missing, "").unwrap();
        assert!(check(Operation::Batch { input: &missing }, &settings).is_ok());
    }
}

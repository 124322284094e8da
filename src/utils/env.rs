/// Get environment variable with WORKSHOP_ prefix, falling back to unprefixed version
///
/// Checks `WORKSHOP_{key}` first, then `{key}`, so deployments that already
/// export plain names keep working.
///
/// # Examples
///
/// ```rust,ignore
/// use workshop_entitlements::utils::get_env_with_prefix;
///
/// // Checks WORKSHOP_CATALOG_PATH first, then CATALOG_PATH
/// let path = get_env_with_prefix("CATALOG_PATH");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("WORKSHOP_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("WORKSHOP_ENV_TEST_VAR", "prefixed_value");
            std::env::set_var("ENV_TEST_VAR", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("WORKSHOP_ENV_TEST_VAR");
        }

        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_MISSING_VAR"), None);
    }
}

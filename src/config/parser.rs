use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is used to detect configuration changes between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[site]
base-url = "https://books.example.com/"

[crawler]
request-delay-ms = 50
fetch-timeout-secs = 5
page-budget = 10

[auth]
token-secret = "test-secret"

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.base_url, "https://books.example.com/");
        assert_eq!(config.crawler.request_delay_ms, 50);
        assert_eq!(config.crawler.fetch_timeout_secs, 5);
        assert_eq!(config.crawler.page_budget, Some(10));
        assert!(!config.crawler.strict_discovery);
        assert_eq!(config.auth.token_ttl_minutes, 30);
    }

    #[test]
    fn test_defaults_applied() {
        let config_content = r#"
[site]
base-url = "https://books.example.com/"

[auth]
token-secret = "test-secret"

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.request_delay_ms, 100);
        assert_eq!(config.site.catalogue_path, "catalogue/");
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.crawler.page_budget, None);
    }

    #[test]
    fn test_catalogue_base_joins_against_site_base() {
        let config_content = r#"
[site]
base-url = "https://books.example.com/"

[auth]
token-secret = "test-secret"

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.site.catalogue_base().as_str(),
            "https://books.example.com/catalogue/"
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[site]
base-url = "https://books.example.com/"

[auth]
token-secret = ""

[output]
database-path = "./test.db"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}

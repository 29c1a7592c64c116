//! Configuration validation rules

use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that:
/// - the site base URL parses and uses an http(s) scheme
/// - the catalogue path resolves against the base URL
/// - the fetch timeout is non-zero
/// - the server bind address parses as a socket address
/// - the token secret is non-empty
/// - the database path is non-empty
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let base = Url::parse(&config.site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "site base-url must be http or https, got {}",
            base.scheme()
        )));
    }

    base.join(&config.site.catalogue_path).map_err(|e| {
        ConfigError::InvalidUrl(format!("catalogue-path {}: {}", config.site.catalogue_path, e))
    })?;

    if config.crawler.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be at least 1".to_string(),
        ));
    }

    if let Some(0) = config.crawler.page_budget {
        return Err(ConfigError::Validation(
            "page-budget must be at least 1 when set".to_string(),
        ));
    }

    config
        .server
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .map_err(|e| {
            ConfigError::Validation(format!("bind-addr {}: {}", config.server.bind_addr, e))
        })?;

    if config.auth.token_secret.trim().is_empty() {
        return Err(ConfigError::Validation(
            "token-secret must not be empty".to_string(),
        ));
    }

    if config.auth.token_ttl_minutes <= 0 {
        return Err(ConfigError::Validation(
            "token-ttl-minutes must be positive".to_string(),
        ));
    }

    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}

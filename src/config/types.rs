use serde::Deserialize;
use url::Url;

/// Main configuration structure for Folio-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub output: OutputConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the catalog site; the landing page with the category sidebar
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path under the base URL where book detail pages live
    #[serde(rename = "catalogue-path", default = "default_catalogue_path")]
    pub catalogue_path: String,
}

impl SiteConfig {
    /// Parsed base URL. Validation guarantees this parses.
    pub fn base(&self) -> Url {
        Url::parse(&self.base_url).expect("validated at load")
    }

    /// Base URL that book detail hrefs are resolved against.
    pub fn catalogue_base(&self) -> Url {
        self.base()
            .join(&self.catalogue_path)
            .expect("validated at load")
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between consecutive page requests (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum pages fetched per category; unset means unbounded
    #[serde(rename = "page-budget", default)]
    pub page_budget: Option<u32>,

    /// When true, a landing-page discovery failure fails the whole ingest
    /// instead of degrading to an empty category list
    #[serde(rename = "strict-discovery", default)]
    pub strict_discovery: bool,

    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            page_budget: None,
            strict_discovery: false,
            user_agent: default_user_agent(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(rename = "bind-addr", default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Token issuance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens and hash passwords
    #[serde(rename = "token-secret")]
    pub token_secret: String,

    /// Access token lifetime (minutes)
    #[serde(rename = "token-ttl-minutes", default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_catalogue_path() -> String {
    "catalogue/".to_string()
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("folio-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    30
}

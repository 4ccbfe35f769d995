use serde::Deserialize;

/// User agent sent when no `[http] user-agent` is configured
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Main configuration structure for Subsite-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL of the site; only pages below it are visited
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// URLs to start from (defaults to the base URL)
    #[serde(rename = "seed-urls", default)]
    pub seed_urls: Vec<String>,

    /// Number of concurrent workers
    #[serde(rename = "worker-pool-size", default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate verification
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// CSS selector of the elements holding the main content
    #[serde(rename = "content-selector", default = "default_content_selector")]
    pub content_selector: String,

    /// CSS selectors of elements removed before extraction
    #[serde(rename = "noise-selectors", default = "default_noise_selectors")]
    pub noise_selectors: Vec<String>,

    /// Wrap width of the converted text
    #[serde(rename = "text-width", default = "default_text_width")]
    pub text_width: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite document store
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_selector: default_content_selector(),
            noise_selectors: default_noise_selectors(),
            text_width: default_text_width(),
        }
    }
}

fn default_worker_pool_size() -> usize {
    1
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_content_selector() -> String {
    "section.content-section".to_string()
}

fn default_noise_selectors() -> Vec<String> {
    vec![
        "script".to_string(),
        "style".to_string(),
        "footer.footer".to_string(),
        "header.header".to_string(),
    ]
}

fn default_text_width() -> usize {
    80
}

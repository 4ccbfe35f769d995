use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
///
/// # Returns
///
/// * `Ok(Config)` - The file parsed and every section passed validation
/// * `Err(ConfigError)` - The file is unreadable, not valid TOML, or fails validation
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use subsite_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Base URL: {}", config.crawler.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 digest of the file at `path`
///
/// Each crawl run records this digest, so runs made with different settings
/// can be told apart in the document store.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration together with the digest of the exact text parsed
///
/// The file is read once, so the digest always matches the loaded settings.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub seed_urls: Vec<String>,
    pub worker_pool_size: Option<usize>,
}

/// Applies command-line overrides to a loaded configuration and re-validates it
///
/// Seeds given on the command line replace the configured seeds rather than
/// being appended to them.
pub fn apply_overrides(config: &mut Config, overrides: ConfigOverrides) -> Result<(), ConfigError> {
    if let Some(base_url) = overrides.base_url {
        config.crawler.base_url = base_url;
    }

    if !overrides.seed_urls.is_empty() {
        config.crawler.seed_urls = overrides.seed_urls;
    }

    if let Some(size) = overrides.worker_pool_size {
        config.crawler.worker_pool_size = size;
    }

    validate(config)
}

use crate::UrlError;
use url::Url;

/// Validates the base URL a crawl is started from
///
/// # Validation Rules
///
/// 1. The URL must not be empty (after trimming whitespace)
/// 2. The URL must parse as an absolute URL
/// 3. The scheme must be `http` or `https`
///
/// The URL is validated but never rewritten: the caller keeps the exact string,
/// since child URLs are built by plain concatenation onto it.
///
/// # Arguments
///
/// * `url_str` - The base URL to validate
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is unusable as a crawl root
///
/// # Examples
///
/// ```
/// use subsite_crawler::url::validate_base_url;
///
/// assert!(validate_base_url("https://example.com").is_ok());
/// assert!(validate_base_url("ftp://example.com").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlError> {
    if url_str.trim().is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

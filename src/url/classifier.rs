use std::collections::HashSet;

/// Returns the part of `current_url` below `base_url`
///
/// When `current_url` does not start with `base_url` the first
/// `base_url.len()` bytes are dropped anyway, and a URL shorter than the base
/// yields an empty subsite.
pub fn current_subsite<'a>(base_url: &str, current_url: &'a str) -> &'a str {
    current_url
        .strip_prefix(base_url)
        .or_else(|| current_url.get(base_url.len()..))
        .unwrap_or("")
}

/// Decides whether `candidate_href` is a child page of `current_url`
///
/// A href is a child when it starts with the current subsite and is not equal
/// to it. The comparison is a plain string prefix, not a path-segment match:
/// `/a/bcd` counts as a child of `/a/b`.
///
/// # Arguments
///
/// * `base_url` - The root URL of the crawl
/// * `current_url` - The URL of the page the href was found on
/// * `candidate_href` - The raw `href` attribute value
///
/// # Examples
///
/// ```
/// use subsite_crawler::url::is_child;
///
/// assert!(is_child("https://x.com", "https://x.com/a", "/a/b"));
/// assert!(!is_child("https://x.com", "https://x.com/a", "/a"));
/// assert!(!is_child("https://x.com", "https://x.com/a", "/b"));
/// ```
pub fn is_child(base_url: &str, current_url: &str, candidate_href: &str) -> bool {
    let subsite = current_subsite(base_url, current_url);
    candidate_href.starts_with(subsite) && candidate_href != subsite
}

/// Collects the absolute URLs of every child href found on a page
///
/// Hrefs are used as written (they are not resolved against the page URL) and
/// the absolute URL is `base_url + href`. Duplicates are dropped, keeping the
/// first occurrence.
pub fn child_urls<S: AsRef<str>>(base_url: &str, current_url: &str, hrefs: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut children = Vec::new();

    for href in hrefs {
        let href = href.as_ref();
        if !is_child(base_url, current_url, href) {
            continue;
        }

        let child = format!("{}{}", base_url, href);
        if seen.insert(child.clone()) {
            children.push(child);
        }
    }

    children
}

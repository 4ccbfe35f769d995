//! HTML parser for extracting page content and links
//!
//! This module handles turning a fetched page into:
//! - The page title (from the `<title>` tag)
//! - The main content as plain text (from the content selector)
//! - The raw `href` values of its links
//!
//! Noise elements (scripts, styles, site header and footer) are removed from
//! the document before anything else is read from it, so links inside them are
//! never followed.

use crate::config::ExtractorConfig;
use crate::ConfigError;
use html2text::render::text_renderer::TrivialDecorator;
use scraper::{Html, Selector};

/// A parsed HTML page
pub struct PageModel {
    document: Html,
}

impl PageModel {
    /// Parses raw page bytes (invalid UTF-8 is replaced, never rejected)
    pub fn parse(raw: &[u8]) -> Self {
        let html = String::from_utf8_lossy(raw);
        Self {
            document: Html::parse_document(&html),
        }
    }

    /// Serializes the current document, without any removed elements
    pub fn html(&self) -> String {
        self.document.root_element().html()
    }
}

/// What the crawler keeps from a page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Text of the page's `<title>`, or `None` when the page has no such element
    pub title: Option<String>,

    /// Main content converted to text
    pub text: String,

    /// Raw `href` attribute values of the page's links
    pub hrefs: Vec<String>,
}

impl ExtractedPage {
    /// Returns true unless the extracted text is empty
    pub fn has_content(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Extracts titles, main content and links from pages
///
/// Selectors are parsed once when the extractor is built.
pub struct ContentExtractor {
    content: Selector,
    noise: Vec<Selector>,
    title: Selector,
    links: Selector,
    text_width: usize,
}

impl ContentExtractor {
    /// Builds an extractor from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ContentExtractor)` - All selectors parsed
    /// * `Err(ConfigError)` - A selector is invalid
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let noise = config
            .noise_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            content: parse_selector(&config.content_selector)?,
            noise,
            title: parse_selector("title")?,
            links: parse_selector("a[href]")?,
            text_width: config.text_width,
        })
    }

    /// Runs the full extraction on raw page bytes
    ///
    /// Order matters: noise is stripped first, then content, title and links
    /// are read from what remains.
    pub fn extract(&self, raw: &[u8]) -> ExtractedPage {
        let mut page = PageModel::parse(raw);
        let removed = self.strip_noise(&mut page);
        tracing::trace!("Removed {} noise elements", removed);

        ExtractedPage {
            title: self.title(&page),
            text: self.main_content(&page),
            hrefs: self.hrefs(&page),
        }
    }

    /// Removes every element matching a noise selector
    ///
    /// # Returns
    ///
    /// The number of elements removed
    pub fn strip_noise(&self, page: &mut PageModel) -> usize {
        let root = page.document.root_element();
        let ids: Vec<_> = self
            .noise
            .iter()
            .flat_map(|selector| root.select(selector).map(|element| element.id()))
            .collect();

        let mut removed = 0;
        for id in ids {
            if let Some(mut node) = page.document.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    /// Converts every main-content element to text and concatenates the results
    ///
    /// Returns an empty string when the page has no main-content element.
    pub fn main_content(&self, page: &PageModel) -> String {
        page.document
            .root_element()
            .select(&self.content)
            .map(|element| to_text(&element.html(), self.text_width))
            .collect()
    }

    /// Extracts the page title
    pub fn title(&self, page: &PageModel) -> Option<String> {
        page.document
            .root_element()
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }

    /// Extracts the raw `href` value of every link still in the document
    pub fn hrefs(&self, page: &PageModel) -> Vec<String> {
        page.document
            .root_element()
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.to_string())
            .collect()
    }
}

/// Converts an HTML fragment to plain text, dropping link targets
pub fn to_text(fragment: &str, width: usize) -> String {
    html2text::from_read_with_decorator(fragment.as_bytes(), width, TrivialDecorator::new())
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

//! HTML metadata extraction for link previews
//!
//! Preference order:
//! - title: `og:title`, then the `<title>` element
//! - description: `og:description`, then `<meta name="description">`
//! - image: `og:image` only; a page without one has no preview image
//!
//! Missing fields are empty strings. Malformed markup is never an error;
//! whatever html5ever recovers is what gets searched.

use scraper::{Html, Selector};
use url::Url;

/// Preview metadata extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

/// Extracts preview metadata from an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, used to resolve a relative `og:image`
///
/// # Example
///
/// ```
/// use preview_pipeline::fetcher::extract_metadata;
/// use url::Url;
///
/// let html = r#"<html><head><title>Plain</title></head><body></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let metadata = extract_metadata(html, &base_url);
/// assert_eq!(metadata.title, "Plain");
/// assert_eq!(metadata.description, "");
/// ```
pub fn extract_metadata(html: &str, base_url: &Url) -> PageMetadata {
    let document = Html::parse_document(html);

    let title = meta_content(&document, "meta[property='og:title']")
        .or_else(|| element_text(&document, "title"))
        .unwrap_or_default();

    let description = meta_content(&document, "meta[property='og:description']")
        .or_else(|| meta_content(&document, "meta[name='description']"))
        .unwrap_or_default();

    let image_url = meta_content(&document, "meta[property='og:image']")
        .map(|src| resolve_image(&src, base_url))
        .unwrap_or_default();

    PageMetadata {
        title,
        description,
        image_url,
    }
}

/// Returns the first non-empty `content` attribute among elements matching `selector`
fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

/// Returns the trimmed text of the first element matching `selector`
fn element_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolves an image reference against the page URL
///
/// Absolute references are kept verbatim; anything that cannot be joined is
/// stored as given.
fn resolve_image(src: &str, base_url: &Url) -> String {
    if Url::parse(src).is_ok() {
        return src.to_string();
    }

    base_url
        .join(src)
        .map(|absolute| absolute.to_string())
        .unwrap_or_else(|_| src.to_string())
}

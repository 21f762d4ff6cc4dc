//! HTML parser for extracting link references
//!
//! This module handles parsing HTML content to extract:
//! - Anchor references (`<a href>`), which may be followed
//! - Image references (`<img src>`), which are only classified
//! - Page title
//!
//! References are returned raw. Resolution, canonicalization and scheme
//! filtering happen in `crate::url::canonicalize`.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// `href` values of every `<a>` element, trimmed, in document order
    pub anchors: Vec<String>,

    /// `src` values of every `<img>` element, trimmed, in document order
    pub images: Vec<String>,
}

impl ParsedPage {
    pub fn reference_count(&self) -> usize {
        self.anchors.len() + self.images.len()
    }
}

/// Parses HTML content and extracts link references
///
/// html5ever recovers from any malformed markup, so parsing cannot fail; a
/// garbled page simply yields fewer references.
///
/// `rel="nofollow"` and `download` anchors are still reported; a link that
/// exists on the page is a link worth classifying.
///
/// # Example
///
/// ```no_run
/// use outlink::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.anchors, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: extract_attribute(&document, "a[href]", "href"),
        images: extract_attribute(&document, "img[src]", "src"),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_attribute(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_anchors_are_raw() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="page2">Link 2</a>
                <a href="https://other.test/page3">Link 3</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html);
        assert_eq!(
            parsed.anchors,
            vec!["/page1", "page2", "https://other.test/page3"]
        );
    }

    #[test]
    fn test_special_schemes_left_for_canonicalization() {
        let html = r#"<html><body>
            <a href="mailto:test@example.test">Email</a>
            <a href="javascript:void(0)">JS</a>
        </body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.anchors.len(), 2);
    }

    #[test]
    fn test_extract_images() {
        let html = r#"<html><body>
            <img src="/logo.png">
            <img src=" https://cdn.partner.test/banner.jpg ">
            <img alt="no source">
        </body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(
            parsed.images,
            vec!["/logo.png", "https://cdn.partner.test/banner.jpg"]
        );
        assert!(parsed.anchors.is_empty());
    }

    #[test]
    fn test_skip_empty_and_missing_href() {
        let html = r#"<html><body><a href="">Empty</a><a href="   ">Blank</a><a>None</a></body></html>"#;
        let parsed = parse_html(html);
        assert!(parsed.anchors.is_empty());
    }

    #[test]
    fn test_nofollow_and_download_are_reported() {
        let html = r#"<html><body>
            <a href="/page" rel="nofollow">Link</a>
            <a href="/file.pdf" download>Download</a>
        </body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.anchors, vec!["/page", "/file.pdf"]);
    }

    #[test]
    fn test_duplicates_kept() {
        let html = r#"<html><body><a href="/a">1</a><a href="/a">2</a><img src="/a"></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.anchors.len(), 2);
        assert_eq!(parsed.reference_count(), 3);
    }

    #[test]
    fn test_malformed_html_still_parses() {
        let html = r#"<html><body><p><a href="/ok">unclosed<p><img src="/pic.png"><a href="/also-ok">x"#;
        let parsed = parse_html(html);
        assert!(parsed.anchors.contains(&"/ok".to_string()));
        assert!(parsed.anchors.contains(&"/also-ok".to_string()));
        assert_eq!(parsed.images, vec!["/pic.png"]);
    }

    #[test]
    fn test_non_html_text_yields_empty_page() {
        let parsed = parse_html("\u{0}\u{1}<<<>>> not markup at all </ ");
        assert_eq!(parsed.title, None);
        assert_eq!(parsed.reference_count(), 0);
    }
}

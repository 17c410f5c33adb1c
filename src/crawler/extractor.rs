//! Anchor extraction and allow-list filtering
//!
//! Only `<a href="...">` targets are considered. Plain text is never
//! scanned for bare URLs, so markup-free bodies contribute nothing.

use crate::crawler::request::{ExtractedLink, TextUnit};
use crate::filter::DomainPatternSet;
use scraper::{Html, Selector};

/// Returns the hrefs of all anchors in `content` that match `patterns`
///
/// Document order and duplicates are preserved. Parsing is best effort:
/// malformed markup yields whatever anchors the parser recovers, never an
/// error.
///
/// # Example
///
/// ```
/// use sublink::crawler::extract_links;
/// use sublink::filter::DomainPatternSet;
///
/// let patterns = DomainPatternSet::new([r"good\.com"]).unwrap();
/// let html = r#"<a href="http://good.com/x">x</a> <a href="http://bad.com/y">y</a>"#;
/// assert_eq!(extract_links(html, &patterns), vec!["http://good.com/x"]);
/// ```
pub fn extract_links(content: &str, patterns: &DomainPatternSet) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let fragment = Html::parse_fragment(content);

    fragment
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| patterns.is_match(href))
        .map(str::to_string)
        .collect()
}

/// Extracts matching links from a text unit and attaches its provenance
pub fn extract_from_unit(unit: &TextUnit, patterns: &DomainPatternSet) -> Vec<ExtractedLink> {
    let submission_date = unit.provenance_timestamp.to_rfc3339();

    extract_links(&unit.raw_content, patterns)
        .into_iter()
        .map(|url| ExtractedLink {
            url,
            submission_title: unit.provenance_title.clone(),
            submission_date: submission_date.clone(),
        })
        .collect()
}

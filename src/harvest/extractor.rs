//! Document extraction
//!
//! This module turns a fetched document into records:
//! - `topic` records from headings that mention a configured keyword
//! - `discussion` records from links whose target contains the discussion marker
//! - the document title
//!
//! Extraction is pure and deterministic. Malformed input never panics; it
//! produces an empty record list plus a `ParseError`.

use crate::config::ExtractConfig;
use crate::model::{Extraction, ExtractionError, Record};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const ELLIPSIS: &str = "...";

/// Pluggable extraction rules
pub trait Extractor: Send + Sync {
    /// Extracts records from raw document bytes
    fn extract(&self, raw_content: &[u8]) -> Extraction;
}

/// Extracts keyword topics and discussion links from HTML
///
/// # Topic Rule
///
/// - Scan `h1`, `h2`, `h3`, `h4`
/// - Keep text longer than `min_heading_length` characters
/// - Keep text whose lowercase form contains any keyword (case-insensitive)
///
/// # Discussion Rule
///
/// - Scan `<a href="...">` elements whose link text is longer than one character
/// - Keep hrefs containing the discussion marker (e.g. `/comments/`)
/// - Drop repeated hrefs within the same document (exact, case-sensitive match)
/// - Truncate titles beyond `title_limit` characters and append `...`
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    keywords: Vec<String>,
    discussion_marker: String,
    title_limit: usize,
    min_heading_length: usize,
}

impl KeywordExtractor {
    /// Creates an extractor from configuration
    ///
    /// # Example
    ///
    /// ```
    /// use topic_harvest::config::ExtractConfig;
    /// use topic_harvest::harvest::{Extractor, KeywordExtractor};
    ///
    /// let extractor = KeywordExtractor::new(&ExtractConfig::default());
    /// let html = b"<html><body><h2>Learning Python Basics</h2></body></html>";
    /// let extraction = extractor.extract(html);
    /// assert_eq!(extraction.records.len(), 1);
    /// ```
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            discussion_marker: config.discussion_marker.clone(),
            title_limit: config.title_limit,
            min_heading_length: config.min_heading_length,
        }
    }

    fn matches_keyword(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    fn extract_topics(&self, document: &Html, records: &mut Vec<Record>) {
        let Ok(heading_selector) = Selector::parse("h1, h2, h3, h4") else {
            return;
        };

        for heading in document.select(&heading_selector) {
            let text = stripped_text(heading);
            if text.chars().count() > self.min_heading_length && self.matches_keyword(&text) {
                records.push(Record::topic(text));
            }
        }
    }

    fn extract_discussions(&self, document: &Html, records: &mut Vec<Record>) {
        let Ok(link_selector) = Selector::parse("a[href]") else {
            return;
        };

        let mut seen_urls = HashSet::new();

        for link in document.select(&link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            let text = stripped_text(link);
            if text.chars().count() <= 1 || !href.contains(self.discussion_marker.as_str()) {
                continue;
            }

            if !seen_urls.insert(href.to_string()) {
                continue;
            }

            records.push(Record::discussion(
                truncate_title(&text, self.title_limit),
                href,
            ));
        }
    }
}

impl Extractor for KeywordExtractor {
    fn extract(&self, raw_content: &[u8]) -> Extraction {
        let html = match std::str::from_utf8(raw_content) {
            Ok(html) => html,
            Err(e) => {
                return Extraction::failed(ExtractionError::parse(format!(
                    "Document is not valid UTF-8: {}",
                    e
                )))
            }
        };

        let document = Html::parse_document(html);

        let mut records = Vec::new();
        self.extract_topics(&document, &mut records);
        self.extract_discussions(&document, &mut records);

        Extraction {
            page_title: extract_title(&document),
            records,
            error: None,
        }
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

/// Joins the element's text nodes, each trimmed of surrounding whitespace
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

/// Truncates to `limit` characters, appending an ellipsis when shortened
fn truncate_title(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

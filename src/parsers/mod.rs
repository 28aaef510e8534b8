pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::config::ExtractorConfig;
use crate::results::{PageDocument, PageSnapshot};

/// Where the extracted text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// A main-content element matched by the given selector
    MainContent(&'static str),
    /// No container matched, the whole body was used
    Body,
    /// The document has no body
    Empty,
}

/// Turns a page's markup into a cleaned, length-bounded snapshot
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractorConfig,
}

impl Extractor {
    /// Create a new extractor with the given options
    pub fn new(options: ExtractorConfig) -> Self {
        Self { options }
    }

    /// Extract a snapshot of the document's readable content
    ///
    /// The markup is parsed into a private tree, so pruning never touches the
    /// caller's document.
    pub fn extract(&self, document: &PageDocument) -> PageSnapshot {
        let (snapshot, source) = self.extract_with_source(document);
        ::log::debug!(
            "Extracted {} characters from {} ({:?})",
            snapshot.text().chars().count(),
            document.url,
            source
        );
        snapshot
    }

    /// Like [`Extractor::extract`], also reporting which region supplied the text
    pub fn extract_with_source(&self, document: &PageDocument) -> (PageSnapshot, ContentSource) {
        let mut copy = html::parse_document(&document.html);

        html::remove_elements(&mut copy, html::NON_CONTENT_TAGS);
        if self.options.strip_layout_chrome {
            html::remove_elements(&mut copy, html::LAYOUT_CHROME_TAGS);
        }

        let (raw, source) = match html::find_main_content(&copy) {
            Some((selector, element)) => (
                html::rendered_text(element),
                ContentSource::MainContent(selector),
            ),
            None => match html::body(&copy) {
                Some(body) => (html::rendered_text(body), ContentSource::Body),
                None => (String::new(), ContentSource::Empty),
            },
        };

        let text = text::truncate(text::normalize_whitespace(&raw), self.options.max_length);
        let title = html::document_title(&copy);

        (
            PageSnapshot::new(text, title, document.url.clone()),
            source,
        )
    }
}

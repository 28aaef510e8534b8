use serde::{Deserialize, Serialize};

/// A tab's live document as the content script sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    /// Location of the document
    pub url: String,

    /// Serialized markup of the current DOM
    pub html: String,
}

impl PageDocument {
    /// Create a new document from a location and its markup
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Cleaned text of a page together with its title and URL.
///
/// Produced fresh by every extraction request and never modified afterwards,
/// so the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    text: String,
    title: String,
    url: String,
}

impl PageSnapshot {
    /// Create a new snapshot
    pub fn new(text: String, title: String, url: String) -> Self {
        Self { text, title, url }
    }

    /// Cleaned, length-bounded body text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document title (may be empty)
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Absolute URL of the source document
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The part of the snapshot kept around for display after summarizing
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Title and URL of the summarized page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub title: String,
    pub url: String,
}

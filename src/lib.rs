//! Summarize the page open in the active browser tab.
//!
//! A content script per tab extracts the page's readable text on request; the
//! orchestrator asks the active tab for it, builds a prompt and sends it to
//! the Gemini API.

pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod filter;
pub mod gemini;
pub mod orchestrator;
pub mod parsers;
pub mod prompt;
pub mod results;
pub mod store;
pub mod tabs;

// Re-export commonly used types for convenience
pub use config::SummarizerConfig;
pub use error::SummarizeError;
pub use orchestrator::Orchestrator;
pub use parsers::Extractor;
pub use prompt::SummaryLength;
pub use results::{PageDocument, PageInfo, PageSnapshot};

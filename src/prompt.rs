use crate::results::PageSnapshot;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long the generated summary should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Brief,
    #[default]
    Short,
    Detailed,
}

impl SummaryLength {
    /// The word used in the prompt's instruction clause
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Brief => "brief",
            SummaryLength::Short => "short",
            SummaryLength::Detailed => "detailed",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the summarization prompt for a page
pub fn build_prompt(length: SummaryLength, snapshot: &PageSnapshot) -> String {
    format!(
        "Give a {} summary of this webpage.\n\nTitle: {}\nContent: {}",
        length.as_str(),
        snapshot.title(),
        snapshot.text()
    )
}

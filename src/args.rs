use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use summarize_page::SummaryLength;

#[derive(Parser, Debug)]
#[command(name = "summarize-page")]
#[command(about = "Summarizes the page open in a browser tab with Gemini")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a page
    Summarize {
        #[command(flatten)]
        target: PageTarget,

        /// Summary length (defaults to the configured one)
        #[arg(short, long, value_enum)]
        length: Option<SummaryLength>,

        /// Copy the summary to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Print the extracted page content as JSON
    Extract {
        #[command(flatten)]
        target: PageTarget,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

/// Which page to work on
#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
pub struct PageTarget {
    /// Open this URL in a browser driven over WebDriver
    #[arg(short, long)]
    pub url: Option<String>,

    /// Load a local HTML file instead of using a browser
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Save an API key
    Set { key: String },
    /// Remove the saved API key
    Clear,
    /// Show whether an API key is saved
    Show,
}

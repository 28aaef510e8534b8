use crate::parsers::text::MAX_LENGTH;
use crate::prompt::SummaryLength;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Configuration for content extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum number of characters kept before the truncation marker
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Also drop nav, footer, header and aside elements before extracting
    #[serde(default)]
    pub strip_layout_chrome: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            strip_layout_chrome: false,
        }
    }
}

/// Configuration for the summarization API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the generative-language API
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Model used for generateContent
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature sent with every request
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Timeout for the whole HTTP exchange
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Top-level configuration of the summarizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Timeout for reading a tab's document over WebDriver
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Where the API key is persisted (defaults to the user config directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_path: Option<PathBuf>,

    /// Summary length used when none is given
    #[serde(default)]
    pub default_length: SummaryLength,

    /// Extra regex patterns for pages that never get a content script
    #[serde(default)]
    pub blocked_url_patterns: Vec<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            extractor: ExtractorConfig::default(),
            webdriver_url: default_webdriver_url(),
            request_timeout_secs: default_request_timeout_secs(),
            credential_path: None,
            default_length: SummaryLength::default(),
            blocked_url_patterns: Vec::new(),
        }
    }
}

impl SummarizerConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply overrides from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    /// Path of the credential file, falling back to the user config directory
    pub fn credential_path(&self) -> PathBuf {
        self.credential_path
            .clone()
            .unwrap_or_else(default_credential_path)
    }
}

/// Default value for max_length
fn default_max_length() -> usize {
    MAX_LENGTH
}

/// Default value for base_url
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Default model
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default sampling temperature
fn default_temperature() -> f64 {
    0.7
}

fn default_api_timeout_secs() -> u64 {
    60
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_request_timeout_secs() -> u64 {
    45
}

/// Default location of the credential file
fn default_credential_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("summarize-page")
        .join("credentials.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SummarizerConfig::from_json("{}").unwrap();
        assert_eq!(config, SummarizerConfig::default());
        assert_eq!(config.extractor.max_length, 100_000);
        assert!(!config.extractor.strip_layout_chrome);
        assert_eq!(config.api.model, "gemini-2.5-flash");
        assert_eq!(config.api.temperature, 0.7);
        assert_eq!(config.default_length, SummaryLength::Short);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "api": { "model": "gemini-2.0-flash" },
            "extractor": { "strip_layout_chrome": true },
            "default_length": "detailed",
            "credential_path": "/tmp/creds.json"
        }"#;
        let config = SummarizerConfig::from_json(json).unwrap();

        assert_eq!(config.api.model, "gemini-2.0-flash");
        assert_eq!(
            config.api.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.extractor.strip_layout_chrome);
        assert_eq!(config.extractor.max_length, 100_000);
        assert_eq!(config.default_length, SummaryLength::Detailed);
        assert_eq!(config.credential_path(), PathBuf::from("/tmp/creds.json"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "webdriver_url": "http://localhost:9515" }"#).unwrap();

        let config = SummarizerConfig::from_file(&path).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_invalid_length_is_rejected() {
        assert!(SummarizerConfig::from_json(r#"{ "default_length": "huge" }"#).is_err());
    }

    #[test]
    fn test_default_credential_path_file_name() {
        let config = SummarizerConfig::default();
        assert!(config.credential_path().ends_with("summarize-page/credentials.json"));
    }
}

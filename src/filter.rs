use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for deciding which pages can host a content script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAccessConfig {
    /// URL schemes owned by the browser itself
    #[serde(default = "default_privileged_schemes")]
    pub privileged_schemes: Vec<String>,

    /// Regex patterns for URLs where scripts are never injected
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
}

/// Schemes where no extension script can run
fn default_privileged_schemes() -> Vec<String> {
    [
        "about",
        "brave",
        "chrome",
        "chrome-extension",
        "chrome-search",
        "chrome-untrusted",
        "devtools",
        "edge",
        "javascript",
        "data",
        "moz-extension",
        "view-source",
    ]
    .iter()
    .map(|scheme| scheme.to_string())
    .collect()
}

impl Default for PageAccessConfig {
    fn default() -> Self {
        Self {
            privileged_schemes: default_privileged_schemes(),
            blocked_patterns: vec![
                // Extension galleries refuse script injection
                r"^https://chromewebstore\.google\.com/".to_string(),
                r"^https://chrome\.google\.com/webstore".to_string(),
                r"^https://microsoftedge\.microsoft\.com/addons".to_string(),
            ],
        }
    }
}

/// Decides whether a page can run the content script
#[derive(Debug)]
pub struct PageAccessFilter {
    config: PageAccessConfig,
    blocked_regexes: Vec<Regex>,
}

impl Default for PageAccessFilter {
    fn default() -> Self {
        Self::new(PageAccessConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl PageAccessFilter {
    /// Create a new filter from configuration
    pub fn new(config: PageAccessConfig) -> Result<Self, regex::Error> {
        let mut blocked_regexes = Vec::with_capacity(config.blocked_patterns.len());
        for pattern in &config.blocked_patterns {
            blocked_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            blocked_regexes,
        })
    }

    /// Default rules plus extra blocked patterns
    pub fn with_extra_patterns(patterns: &[String]) -> Result<Self, regex::Error> {
        let mut config = PageAccessConfig::default();
        config.blocked_patterns.extend(patterns.iter().cloned());
        Self::new(config)
    }

    /// Whether a content script can be injected into a page at `url`
    pub fn allows_content_script(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => {
                ::log::debug!("Unparseable page URL, no content script: {}", url);
                return false;
            }
        };

        if self.is_privileged_scheme(&parsed) {
            ::log::debug!("Privileged page, no content script: {}", url);
            return false;
        }

        let url_str = parsed.as_str();
        for regex in &self.blocked_regexes {
            if regex.is_match(url_str) {
                ::log::debug!("Blocked page, no content script: {}", url);
                return false;
            }
        }

        true
    }

    fn is_privileged_scheme(&self, url: &Url) -> bool {
        self.config
            .privileged_schemes
            .iter()
            .any(|scheme| scheme.eq_ignore_ascii_case(url.scheme()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = PageAccessFilter::default();

        // Ordinary web pages and local files get a script
        assert!(filter.allows_content_script("https://example.com/article"));
        assert!(filter.allows_content_script("http://localhost:8080/"));
        assert!(filter.allows_content_script("file:///home/user/page.html"));

        // Browser-owned pages never do
        assert!(!filter.allows_content_script("chrome://settings"));
        assert!(!filter.allows_content_script("about:blank"));
        assert!(!filter.allows_content_script(
            "chrome-extension://abcdefghijklmnop/popup.html"
        ));
        assert!(!filter.allows_content_script("view-source:https://example.com"));
    }

    #[test]
    fn test_web_store_is_blocked() {
        let filter = PageAccessFilter::default();
        assert!(!filter.allows_content_script(
            "https://chromewebstore.google.com/detail/some-extension/abc"
        ));
        assert!(!filter.allows_content_script(
            "https://chrome.google.com/webstore/detail/abc"
        ));
    }

    #[test]
    fn test_unparseable_url() {
        let filter = PageAccessFilter::default();
        assert!(!filter.allows_content_script("not a url"));
        assert!(!filter.allows_content_script(""));
    }

    #[test]
    fn test_extra_patterns() {
        let filter =
            PageAccessFilter::with_extra_patterns(&[r"^https://intranet\.example\.com/".to_string()])
                .unwrap();
        assert!(!filter.allows_content_script("https://intranet.example.com/wiki"));
        assert!(filter.allows_content_script("https://example.com/wiki"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = PageAccessConfig {
            privileged_schemes: vec![],
            blocked_patterns: vec!["(unclosed".to_string()],
        };
        assert!(PageAccessFilter::new(config).is_err());
    }
}

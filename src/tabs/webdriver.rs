//! Tabs of a real browser driven over WebDriver.
//!
//! The browser's current window is the active tab. Its content script reads
//! the serialized live DOM through the session, so every request sees the page
//! as it is at that moment.

use crate::bridge::{BridgeError, ContentScript, DocumentSource, TabPort};
use crate::error::SummarizeError;
use crate::filter::PageAccessFilter;
use crate::parsers::Extractor;
use crate::results::PageDocument;
use crate::tabs::{Tab, TabHost};
use async_trait::async_trait;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Endpoints tried when the configured WebDriver URL does not answer
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://127.0.0.1:4444",
];

/// Reads the current window's document through the WebDriver session
struct SessionDocument {
    client: Client,
    read_timeout: Duration,
}

#[async_trait]
impl DocumentSource for SessionDocument {
    async fn current_document(&self) -> Result<Option<PageDocument>, String> {
        let read = async {
            let url = self.client.current_url().await?;
            let html = self.client.source().await?;
            Ok::<_, fantoccini::error::CmdError>(PageDocument::new(url.as_str(), html))
        };

        match timeout(self.read_timeout, read).await {
            Ok(Ok(document)) => Ok(Some(document)),
            Ok(Err(e)) => Err(describe_command_error(&e)),
            Err(_) => Err(format!(
                "timed out after {}s reading the document",
                self.read_timeout.as_secs()
            )),
        }
    }
}

/// Tab host backed by a WebDriver session
pub struct WebDriverTabs {
    client: Client,
    filter: Arc<PageAccessFilter>,
    extractor: Arc<Extractor>,
    read_timeout: Duration,
    windows: Mutex<HashMap<String, WindowHandle>>,
    ports: Mutex<HashMap<String, TabPort>>,
}

impl WebDriverTabs {
    /// Connects to the WebDriver at `webdriver_url`, trying common local
    /// endpoints when it does not answer
    pub async fn connect(
        webdriver_url: &str,
        filter: Arc<PageAccessFilter>,
        extractor: Arc<Extractor>,
        read_timeout: Duration,
    ) -> Result<Self, SummarizeError> {
        let client = connect_to_webdriver(webdriver_url).await?;
        Ok(Self {
            client,
            filter,
            extractor,
            read_timeout,
            windows: Mutex::new(HashMap::new()),
            ports: Mutex::new(HashMap::new()),
        })
    }

    /// Navigates the current window to `url`
    pub async fn open(&self, url: &str) -> Result<(), SummarizeError> {
        ::log::info!("Opening {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| SummarizeError::HostUnavailable(describe_command_error(&e)))
    }

    /// Ends the WebDriver session
    pub async fn shutdown(&self) {
        self.ports.lock().await.clear();
        if let Err(e) = self.client.clone().close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }

    /// Port of the content script in the given window, injected on first use
    async fn port_for(&self, tab_id: &str) -> TabPort {
        let mut ports = self.ports.lock().await;
        ports.retain(|_, port| port.is_connected());

        ports
            .entry(tab_id.to_string())
            .or_insert_with(|| {
                ::log::debug!("Injecting content script into window {}", tab_id);
                let source = SessionDocument {
                    client: self.client.clone(),
                    read_timeout: self.read_timeout,
                };
                ContentScript::new(source, Arc::clone(&self.extractor)).inject()
            })
            .clone()
    }
}

#[async_trait]
impl TabHost for WebDriverTabs {
    async fn query_active_tab(&self) -> Option<Tab> {
        let handle = match self.client.window().await {
            Ok(handle) => handle,
            Err(e) => {
                ::log::warn!("No active window: {}", describe_command_error(&e));
                return None;
            }
        };

        let id = String::from(handle.clone());
        self.windows.lock().await.insert(id.clone(), handle);

        let url = self.client.current_url().await.ok().map(|url| url.to_string());
        let title = self.client.title().await.ok();

        Some(Tab { id, url, title })
    }

    async fn send_message(&self, tab: &Tab, message: Value) -> Result<Value, BridgeError> {
        let handle = self
            .windows
            .lock()
            .await
            .get(&tab.id)
            .cloned()
            .ok_or_else(|| BridgeError::UnknownTab(tab.id.clone()))?;

        if let Err(e) = self.client.switch_to_window(handle).await {
            ::log::warn!(
                "Could not focus window {}: {}",
                tab.id,
                describe_command_error(&e)
            );
            return Err(BridgeError::NoReceiver);
        }

        let url = self
            .client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|_| BridgeError::NoReceiver)?;
        if !self.filter.allows_content_script(&url) {
            return Err(BridgeError::NoReceiver);
        }

        self.port_for(&tab.id).await.send_message(message).await
    }
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, SummarizeError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    Err(SummarizeError::HostUnavailable(format!(
        "no WebDriver server answered at {} (set WEBDRIVER_URL to point at a running ChromeDriver or geckodriver)",
        webdriver_url
    )))
}

/// Turns a WebDriver command error into a log-friendly description
fn describe_command_error(error: &fantoccini::error::CmdError) -> String {
    let text = error.to_string();
    if text.contains("Unable to find session") || text.contains("invalid session id") {
        format!("lost WebDriver session: {}", text)
    } else {
        text
    }
}

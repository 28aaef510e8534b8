pub mod local;
pub mod webdriver;

use crate::bridge::BridgeError;
use async_trait::async_trait;
use serde_json::Value;

/// Descriptor of a browser tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
}

/// The browser side the orchestrator talks to
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The active tab of the focused window, if there is one
    async fn query_active_tab(&self) -> Option<Tab>;

    /// Delivers a message to the tab's content script and waits for its reply
    async fn send_message(&self, tab: &Tab, message: Value) -> Result<Value, BridgeError>;
}

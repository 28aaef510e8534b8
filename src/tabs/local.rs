//! In-process tabs holding documents loaded from memory or disk.

use crate::bridge::{BridgeError, ContentScript, DocumentSource, TabPort};
use crate::filter::PageAccessFilter;
use crate::parsers::Extractor;
use crate::results::PageDocument;
use crate::tabs::{Tab, TabHost};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Live document shared between a tab and its content script
#[derive(Clone)]
struct LiveDocument(Arc<RwLock<PageDocument>>);

#[async_trait]
impl DocumentSource for LiveDocument {
    async fn current_document(&self) -> Result<Option<PageDocument>, String> {
        Ok(Some(self.0.read().await.clone()))
    }
}

struct LocalTab {
    id: String,
    document: LiveDocument,
    port: Option<TabPort>,
}

#[derive(Default)]
struct TabsState {
    tabs: Vec<LocalTab>,
    active: Option<String>,
    next_id: usize,
}

/// A window of tabs living in this process.
///
/// Opening a tab injects a content script unless the page is one where the
/// browser would refuse it.
pub struct LocalTabs {
    filter: Arc<PageAccessFilter>,
    extractor: Arc<Extractor>,
    state: Mutex<TabsState>,
}

impl LocalTabs {
    pub fn new(filter: Arc<PageAccessFilter>, extractor: Arc<Extractor>) -> Self {
        Self {
            filter,
            extractor,
            state: Mutex::new(TabsState::default()),
        }
    }

    /// Opens a tab on the document and focuses it
    pub async fn open(&self, document: PageDocument) -> Tab {
        let inject = self.filter.allows_content_script(&document.url);
        self.open_tab(document, inject).await
    }

    /// Opens a tab whose page loaded before any content script was available
    pub async fn open_without_script(&self, document: PageDocument) -> Tab {
        self.open_tab(document, false).await
    }

    async fn open_tab(&self, document: PageDocument, inject: bool) -> Tab {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = state.next_id.to_string();

        let url = document.url.clone();
        let live = LiveDocument(Arc::new(RwLock::new(document)));
        let port = if inject {
            Some(ContentScript::new(live.clone(), Arc::clone(&self.extractor)).inject())
        } else {
            ::log::debug!("Tab {} opened without a content script: {}", id, url);
            None
        };

        state.tabs.push(LocalTab {
            id: id.clone(),
            document: live,
            port,
        });
        state.active = Some(id.clone());

        Tab {
            id,
            url: Some(url),
            title: None,
        }
    }

    /// Replaces a tab's document in place, as a script mutating the DOM would.
    ///
    /// The content script keeps running and sees the new document.
    pub async fn update_document(&self, tab_id: &str, html: &str) -> Result<(), BridgeError> {
        let state = self.state.lock().await;
        let tab = state
            .tabs
            .iter()
            .find(|tab| tab.id == tab_id)
            .ok_or_else(|| BridgeError::UnknownTab(tab_id.to_string()))?;

        tab.document.0.write().await.html = html.to_string();
        Ok(())
    }

    /// Focuses a tab, returns false when there is no such tab
    pub async fn activate(&self, tab_id: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.tabs.iter().any(|tab| tab.id == tab_id) {
            state.active = Some(tab_id.to_string());
            true
        } else {
            false
        }
    }

    /// Closes a tab, stopping its content script
    pub async fn close(&self, tab_id: &str) {
        let mut state = self.state.lock().await;
        state.tabs.retain(|tab| tab.id != tab_id);
        if state.active.as_deref() == Some(tab_id) {
            state.active = state.tabs.last().map(|tab| tab.id.clone());
        }
    }
}

#[async_trait]
impl TabHost for LocalTabs {
    async fn query_active_tab(&self) -> Option<Tab> {
        let state = self.state.lock().await;
        let active = state.active.as_deref()?;
        let tab = state.tabs.iter().find(|tab| tab.id == active)?;

        Some(Tab {
            id: tab.id.clone(),
            url: Some(tab.document.0.read().await.url.clone()),
            title: None,
        })
    }

    async fn send_message(&self, tab: &Tab, message: Value) -> Result<Value, BridgeError> {
        let port = {
            let state = self.state.lock().await;
            let local = state
                .tabs
                .iter()
                .find(|local| local.id == tab.id)
                .ok_or_else(|| BridgeError::UnknownTab(tab.id.clone()))?;
            local.port.clone().ok_or(BridgeError::NoReceiver)?
        };

        port.send_message(message).await
    }
}

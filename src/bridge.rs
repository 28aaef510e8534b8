//! Request/response messaging between the orchestrator and a tab's content script.
//!
//! Each tab with a live content script owns a request channel. A request
//! carries a one-shot reply slot that stays open until the script answers, so
//! the sender awaits exactly one response, or learns that nobody will answer.

use crate::error::SummarizeError;
use crate::parsers::Extractor;
use crate::results::{PageDocument, PageSnapshot};
use crate::tabs::TabHost;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Action name of the page-content request
pub const GET_PAGE_CONTENT: &str = "getPageContent";

/// Requests understood by the content script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ExtensionRequest {
    #[serde(rename = "getPageContent")]
    GetPageContent,
}

impl ExtensionRequest {
    /// Wire form of the request
    pub fn to_message(self) -> Value {
        match self {
            ExtensionRequest::GetPageContent => serde_json::json!({ "action": GET_PAGE_CONTENT }),
        }
    }
}

/// Reply of the content script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<PageSnapshot>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Nothing is listening in the target tab
    #[error("receiving end does not exist")]
    NoReceiver,

    /// The listener went away without answering
    #[error("message port closed before a response was received")]
    PortClosed,

    #[error("no tab with id {0}")]
    UnknownTab(String),
}

/// Source of the live document a content script reads from
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    /// Current state of the document, `None` when it has no content at all
    async fn current_document(&self) -> Result<Option<PageDocument>, String>;
}

struct Envelope {
    message: Value,
    reply: oneshot::Sender<Value>,
}

/// Sending side of a tab's content-script channel
#[derive(Clone)]
pub struct TabPort {
    tx: mpsc::Sender<Envelope>,
}

impl TabPort {
    /// Sends a message and waits for the single reply
    pub async fn send_message(&self, message: Value) -> Result<Value, BridgeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                message,
                reply: reply_tx,
            })
            .await
            .map_err(|_| BridgeError::NoReceiver)?;

        reply_rx.await.map_err(|_| BridgeError::PortClosed)
    }

    /// Whether the content script behind this port is still running
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// In-page listener that answers extraction requests for one tab
pub struct ContentScript<S> {
    source: S,
    extractor: Arc<Extractor>,
}

impl<S: DocumentSource> ContentScript<S> {
    pub fn new(source: S, extractor: Arc<Extractor>) -> Self {
        Self { source, extractor }
    }

    /// Starts the listener task and returns the port addressing it.
    ///
    /// The task ends once every clone of the port is dropped.
    pub fn inject(self) -> TabPort {
        let (tx, rx) = mpsc::channel::<Envelope>(16);
        tokio::spawn(self.listen(rx));
        TabPort { tx }
    }

    async fn listen(self, mut rx: mpsc::Receiver<Envelope>) {
        while let Some(envelope) = rx.recv().await {
            match self.handle(envelope.message).await {
                Some(reply) => {
                    if envelope.reply.send(reply).is_err() {
                        ::log::debug!("Requester went away before the reply was sent");
                    }
                }
                // Dropping the reply slot tells the requester nobody answered
                None => drop(envelope.reply),
            }
        }
        ::log::trace!("Content script listener stopped");
    }

    /// Answers one message, `None` when the document could not be read
    pub async fn handle(&self, message: Value) -> Option<Value> {
        let request = match serde_json::from_value::<ExtensionRequest>(message) {
            Ok(request) => request,
            Err(e) => {
                ::log::debug!("Ignoring unrecognized message: {}", e);
                return Some(response_value(ExtensionResponse::default()));
            }
        };

        match request {
            ExtensionRequest::GetPageContent => {
                let document = match self.source.current_document().await {
                    Ok(document) => document,
                    Err(e) => {
                        ::log::warn!("Content script could not read the document: {}", e);
                        return None;
                    }
                };

                let snapshot = match document {
                    Some(document) => self.extractor.extract(&document),
                    None => PageSnapshot::new(String::new(), String::new(), String::new()),
                };

                Some(response_value(ExtensionResponse {
                    content: Some(snapshot),
                }))
            }
        }
    }
}

fn response_value(response: ExtensionResponse) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}

/// Asks the active tab's content script for a snapshot of its page
pub async fn request_page_content(host: &dyn TabHost) -> Result<PageSnapshot, SummarizeError> {
    let tab = host
        .query_active_tab()
        .await
        .ok_or(SummarizeError::NoActiveTab)?;

    ::log::debug!("Requesting page content from tab {}", tab.id);

    let reply = host
        .send_message(&tab, ExtensionRequest::GetPageContent.to_message())
        .await
        .map_err(|e| {
            ::log::warn!("Could not reach content script in tab {}: {}", tab.id, e);
            SummarizeError::ExtractorUnreachable
        })?;

    let response = serde_json::from_value::<ExtensionResponse>(reply).unwrap_or_default();
    response.content.ok_or(SummarizeError::NoContentExtracted)
}

//! The popup side: credential handling, the summarize flow and its view state.

pub mod state;


use crate::bridge;
use crate::clipboard::Clipboard;
use crate::error::SummarizeError;
use crate::gemini::GeminiClient;
use crate::prompt::{SummaryLength, build_prompt};
use crate::results::PageInfo;
use crate::store::{API_KEY_STORAGE_KEY, CredentialStore};
use crate::tabs::TabHost;
use state::{SummarizeEvent, SummarizeState, transition};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long the "copied" confirmation stays visible
pub const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

/// Drives summarize actions against the active tab
pub struct Orchestrator {
    tabs: Arc<dyn TabHost>,
    store: Arc<dyn CredentialStore>,
    api: GeminiClient,
    clipboard: Box<dyn Clipboard>,
    state: SummarizeState,
    length: SummaryLength,
    saved_api_key: Option<String>,
    notice: Option<String>,
    copied_at: Option<Instant>,
}

impl Orchestrator {
    /// Create an orchestrator, reading the saved credential once
    pub fn new(
        tabs: Arc<dyn TabHost>,
        store: Arc<dyn CredentialStore>,
        api: GeminiClient,
        clipboard: Box<dyn Clipboard>,
    ) -> Result<Self, SummarizeError> {
        let saved_api_key = store
            .get(API_KEY_STORAGE_KEY)?
            .filter(|key| !key.is_empty());

        ::log::debug!(
            "Orchestrator ready, API key {}",
            if saved_api_key.is_some() { "present" } else { "missing" }
        );

        Ok(Self {
            tabs,
            store,
            api,
            clipboard,
            state: SummarizeState::Idle,
            length: SummaryLength::default(),
            saved_api_key,
            notice: None,
            copied_at: None,
        })
    }

    /// Set the summary length used by the next action
    pub fn with_length(mut self, length: SummaryLength) -> Self {
        self.length = length;
        self
    }

    pub fn set_length(&mut self, length: SummaryLength) {
        self.length = length;
    }

    pub fn length(&self) -> SummaryLength {
        self.length
    }

    pub fn has_api_key(&self) -> bool {
        self.saved_api_key.is_some()
    }

    /// The saved key with all but its last four characters masked
    pub fn masked_api_key(&self) -> Option<String> {
        self.saved_api_key.as_deref().map(mask_key)
    }

    /// Persist a new API key; blank input is rejected
    pub fn save_api_key(&mut self, api_key: &str) -> Result<(), SummarizeError> {
        if api_key.trim().is_empty() {
            self.notice = Some(SummarizeError::MissingApiKey.to_string());
            return Err(SummarizeError::MissingApiKey);
        }

        self.store.set(API_KEY_STORAGE_KEY, api_key)?;
        self.saved_api_key = Some(api_key.to_string());
        self.notice = None;
        ::log::info!("Saved API key");
        Ok(())
    }

    /// Forget the saved API key
    pub fn clear_api_key(&mut self) -> Result<(), SummarizeError> {
        self.store.remove(API_KEY_STORAGE_KEY)?;
        self.saved_api_key = None;
        if !self.state.is_busy() {
            self.apply(SummarizeEvent::Reset)?;
        }
        ::log::info!("Cleared API key");
        Ok(())
    }

    /// Run one summarize action to completion.
    ///
    /// Every failure ends up in the view state as a single message; the
    /// returned state is the terminal one.
    pub async fn summarize(&mut self) -> &SummarizeState {
        if let Err(e) = self.apply(SummarizeEvent::Start) {
            ::log::warn!("Ignoring summarize request: {}", e);
            return &self.state;
        }
        self.notice = None;
        self.copied_at = None;

        let event = match self.run_summary().await {
            Ok(summary) => SummarizeEvent::Completed(summary),
            Err(e) => {
                ::log::warn!("Summarize failed: {}", e);
                SummarizeEvent::Failed(e.to_string())
            }
        };

        if let Err(e) = self.apply(event) {
            ::log::error!("Summarize ended in an unexpected state: {}", e);
        }
        &self.state
    }

    async fn run_summary(&mut self) -> Result<String, SummarizeError> {
        let api_key = self
            .saved_api_key
            .clone()
            .ok_or(SummarizeError::MissingApiKey)?;

        let snapshot = bridge::request_page_content(self.tabs.as_ref()).await?;
        ::log::info!(
            "Extracted {} characters from {}",
            snapshot.text().chars().count(),
            snapshot.url()
        );
        self.apply(SummarizeEvent::Extracted(snapshot.page_info()))?;

        let prompt = build_prompt(self.length, &snapshot);
        self.apply(SummarizeEvent::PromptBuilt)?;

        self.api.generate_summary(&api_key, &prompt).await
    }

    fn apply(&mut self, event: SummarizeEvent) -> Result<(), SummarizeError> {
        self.state = transition(&self.state, event)?;
        ::log::debug!("Summarize state: {}", self.state.name());
        Ok(())
    }

    /// Copy the current summary to the clipboard
    pub fn copy_summary(&mut self) -> Result<(), SummarizeError> {
        let summary = match &self.state {
            SummarizeState::Done { summary, .. } => summary.clone(),
            _ => return Err(SummarizeError::NothingToCopy),
        };

        match self.clipboard.write_text(&summary) {
            Ok(()) => {
                self.copied_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                ::log::warn!("Clipboard write failed: {}", e);
                let err = SummarizeError::from(e);
                self.notice = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn state(&self) -> &SummarizeState {
        &self.state
    }

    /// Whether an action is in flight (the trigger is disabled meanwhile)
    pub fn is_loading(&self) -> bool {
        self.state.is_busy()
    }

    pub fn summary(&self) -> Option<&str> {
        match &self.state {
            SummarizeState::Done { summary, .. } => Some(summary),
            _ => None,
        }
    }

    /// The one error message currently shown, if any
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SummarizeState::Failed { message, .. } => Some(message),
            _ => self.notice.as_deref(),
        }
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        self.state.page()
    }

    /// Summary split into the lines it is displayed as
    pub fn summary_lines(&self) -> Vec<&str> {
        self.summary()
            .map(|summary| summary.split('\n').collect())
            .unwrap_or_default()
    }

    /// Whether the copy confirmation is still showing
    pub fn is_copied(&self) -> bool {
        self.copied_at
            .map(|at| at.elapsed() < COPIED_FEEDBACK)
            .unwrap_or(false)
    }
}

fn mask_key(key: &str) -> String {
    let chars = key.chars().count();
    if chars <= 4 {
        return "*".repeat(chars);
    }
    let visible = key.chars().skip(chars - 4).collect::<String>();
    format!("{}{}", "*".repeat(chars - 4), visible)
}

use crate::results::PageInfo;
use thiserror::Error;

/// Progress of one summarize action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SummarizeState {
    #[default]
    Idle,
    /// Waiting for the content script's snapshot
    Extracting,
    /// Snapshot received, prompt being built
    Prompting { page: PageInfo },
    /// Request sent to the summarization API
    AwaitingApi { page: PageInfo },
    Done { page: PageInfo, summary: String },
    Failed {
        page: Option<PageInfo>,
        message: String,
    },
}

/// Inputs that move the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizeEvent {
    /// The user asked for a summary
    Start,
    Extracted(PageInfo),
    PromptBuilt,
    Completed(String),
    Failed(String),
    /// Back to idle, dropping any result
    Reset,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply {event} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl SummarizeState {
    /// Whether an action is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SummarizeState::Extracting
                | SummarizeState::Prompting { .. }
                | SummarizeState::AwaitingApi { .. }
        )
    }

    /// Whether the last action has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, SummarizeState::Done { .. } | SummarizeState::Failed { .. })
    }

    /// Page the current or last action is about
    pub fn page(&self) -> Option<&PageInfo> {
        match self {
            SummarizeState::Prompting { page }
            | SummarizeState::AwaitingApi { page }
            | SummarizeState::Done { page, .. } => Some(page),
            SummarizeState::Failed { page, .. } => page.as_ref(),
            SummarizeState::Idle | SummarizeState::Extracting => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SummarizeState::Idle => "idle",
            SummarizeState::Extracting => "extracting",
            SummarizeState::Prompting { .. } => "prompting",
            SummarizeState::AwaitingApi { .. } => "awaiting api",
            SummarizeState::Done { .. } => "done",
            SummarizeState::Failed { .. } => "failed",
        }
    }
}

impl SummarizeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SummarizeEvent::Start => "start",
            SummarizeEvent::Extracted(_) => "extracted",
            SummarizeEvent::PromptBuilt => "prompt built",
            SummarizeEvent::Completed(_) => "completed",
            SummarizeEvent::Failed(_) => "failed",
            SummarizeEvent::Reset => "reset",
        }
    }
}

/// Computes the state that follows `state` on `event`
pub fn transition(
    state: &SummarizeState,
    event: SummarizeEvent,
) -> Result<SummarizeState, InvalidTransition> {
    use SummarizeEvent as E;
    use SummarizeState as S;

    let invalid = InvalidTransition {
        state: state.name(),
        event: event.name(),
    };

    match (state, event) {
        (S::Idle | S::Done { .. } | S::Failed { .. }, E::Start) => Ok(S::Extracting),
        (S::Idle | S::Done { .. } | S::Failed { .. }, E::Reset) => Ok(S::Idle),
        (S::Extracting, E::Extracted(page)) => Ok(S::Prompting { page }),
        (S::Prompting { page }, E::PromptBuilt) => Ok(S::AwaitingApi { page: page.clone() }),
        (S::AwaitingApi { page }, E::Completed(summary)) => Ok(S::Done {
            page: page.clone(),
            summary,
        }),
        (busy, E::Failed(message)) if busy.is_busy() => Ok(S::Failed {
            page: busy.page().cloned(),
            message,
        }),
        _ => Err(invalid),
    }
}

//! Panel lifecycle events and user notices.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Panels that can be opened from the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    WeeklySummary,
    TextAnalysis,
    AskAi,
    SnippetConsole,
}

impl PanelKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            PanelKind::WeeklySummary => "Weekly Summary",
            PanelKind::TextAnalysis => "Text Analysis",
            PanelKind::AskAi => "Ask AI",
            PanelKind::SnippetConsole => "Snippet Console",
        }
    }
}

/// Panel controls that trigger a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Generate,
    Regenerate,
    Analyze,
    Modify,
    Ask,
    Translate,
}

/// Lifecycle event emitted by a panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PanelEvent {
    Opened {
        panel: PanelKind,
    },
    RequestStarted {
        panel: PanelKind,
        request_id: Uuid,
        control: Control,
    },
    RequestSucceeded {
        panel: PanelKind,
        request_id: Uuid,
        duration_ms: u64,
    },
    RequestFailed {
        panel: PanelKind,
        request_id: Uuid,
        error: String,
        duration_ms: u64,
    },
    /// Panel content was written back into the host document
    Accepted {
        panel: PanelKind,
    },
    Closed {
        panel: PanelKind,
    },
}

impl PanelEvent {
    pub fn panel(&self) -> PanelKind {
        match self {
            PanelEvent::Opened { panel }
            | PanelEvent::RequestStarted { panel, .. }
            | PanelEvent::RequestSucceeded { panel, .. }
            | PanelEvent::RequestFailed { panel, .. }
            | PanelEvent::Accepted { panel }
            | PanelEvent::Closed { panel } => *panel,
        }
    }
}

/// Transient, non-blocking user notice (toast).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(notice = message, "user notice");
    }
}

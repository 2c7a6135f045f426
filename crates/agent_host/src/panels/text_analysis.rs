//! Text analysis panel: critique, then optionally rewrite by the critique.

use parking_lot::Mutex;
use shared::document::HostDocument;
use shared::events::{Control, PanelEvent, PanelKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{PanelContext, Region, RegionCell};
use crate::request::{RequestOutcome, RequestRunner};
use crate::AiAgent;

const ANALYZING: &str = "Analyzing...";
const APPLYING: &str = "Applying suggestions...";
const ANALYSIS_FAILED: &str = "Analysis request failed, please retry";
const MODIFY_FAILED: &str = "Modification request failed, please retry";

#[derive(Debug, Clone)]
pub struct AnalysisView {
    /// Editable copy of the selection
    pub original: String,
    pub original_loading: Option<&'static str>,
    pub suggestions: Region,
    pub can_analyze: bool,
    pub can_modify: bool,
}

pub struct TextAnalysisPanel {
    agent: AiAgent,
    document: Arc<dyn HostDocument>,
    runner: RequestRunner,
    original: Mutex<String>,
    original_loading: Mutex<Option<&'static str>>,
    suggestions: RegionCell,
    open: AtomicBool,
}

impl TextAnalysisPanel {
    pub fn open(ctx: PanelContext, selected_text: impl Into<String>) -> Self {
        let runner = ctx.runner(PanelKind::TextAnalysis);
        runner.send_event(PanelEvent::Opened {
            panel: PanelKind::TextAnalysis,
        });

        Self {
            agent: ctx.agent,
            document: ctx.document,
            runner,
            original: Mutex::new(selected_text.into()),
            original_loading: Mutex::new(None),
            suggestions: RegionCell::default(),
            open: AtomicBool::new(true),
        }
    }

    /// Open and immediately run the first analysis.
    pub async fn show(ctx: PanelContext, selected_text: impl Into<String>) -> Self {
        let panel = Self::open(ctx, selected_text);
        panel.analyze().await;
        panel
    }

    /// Request suggestions for the current (possibly edited) text.
    pub async fn analyze(&self) -> RequestOutcome {
        if !self.is_open() {
            return RequestOutcome::Ignored;
        }
        let text = self.original.lock().clone();
        if text.trim().is_empty() {
            return RequestOutcome::Skipped;
        }
        let Some(ticket) = self.runner.begin(Control::Analyze) else {
            return RequestOutcome::Ignored;
        };

        let previous = self.suggestions.begin_loading(ANALYZING);
        match ticket
            .finish(self.agent.analyze_text(&text), ANALYSIS_FAILED)
            .await
        {
            Ok(suggestions) => {
                self.suggestions.set(Region::Rendered(suggestions));
                RequestOutcome::Completed
            }
            Err(_) => {
                self.suggestions.set(previous);
                RequestOutcome::Failed
            }
        }
    }

    /// Rewrite the original text according to the displayed suggestions.
    pub async fn modify(&self) -> RequestOutcome {
        if !self.is_open() {
            return RequestOutcome::Ignored;
        }
        let original = self.original.lock().clone();
        if original.trim().is_empty() {
            return RequestOutcome::Skipped;
        }
        let suggestions = self.suggestions.get().text().unwrap_or_default().to_string();
        let Some(ticket) = self.runner.begin(Control::Modify) else {
            return RequestOutcome::Ignored;
        };

        *self.original_loading.lock() = Some(APPLYING);
        let result = ticket
            .finish(
                self.agent.process_modification(&original, &suggestions),
                MODIFY_FAILED,
            )
            .await;
        *self.original_loading.lock() = None;

        match result {
            Ok(modified) => {
                *self.original.lock() = modified;
                RequestOutcome::Completed
            }
            Err(_) => RequestOutcome::Failed,
        }
    }

    pub fn edit_original(&self, text: impl Into<String>) {
        *self.original.lock() = text.into();
    }

    /// Replace the host selection with the edited text and close.
    pub fn apply(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        let text = self.original.lock().clone();
        self.document.replace_selection(&text);
        self.runner.send_event(PanelEvent::Accepted {
            panel: PanelKind::TextAnalysis,
        });
        self.close();
        true
    }

    pub fn view(&self) -> AnalysisView {
        let idle = self.is_open() && self.runner.is_idle();
        AnalysisView {
            original: self.original.lock().clone(),
            original_loading: *self.original_loading.lock(),
            suggestions: self.suggestions.get(),
            can_analyze: idle,
            can_modify: idle,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.runner.send_event(PanelEvent::Closed {
                panel: PanelKind::TextAnalysis,
            });
        }
    }
}

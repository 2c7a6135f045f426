//! Q&A and translation over the selected text.

use parking_lot::Mutex;
use shared::document::HostDocument;
use shared::events::{Control, PanelEvent, PanelKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{insert_below_cursor, PanelContext, Region, RegionCell};
use crate::request::{RequestOutcome, RequestRunner};
use crate::AiAgent;

const THINKING: &str = "Thinking...";
const TRANSLATING: &str = "Translating...";
const ASK_FAILED: &str = "Question could not be answered, please retry";
const TRANSLATE_FAILED: &str = "Translation failed, please retry";

#[derive(Debug, Clone)]
pub struct AskView {
    pub selected_text: String,
    pub question: String,
    pub response: Region,
    pub can_ask: bool,
    pub can_translate: bool,
}

pub struct AskAiPanel {
    selected_text: String,
    agent: AiAgent,
    document: Arc<dyn HostDocument>,
    runner: RequestRunner,
    question: Mutex<String>,
    response: RegionCell,
    open: AtomicBool,
}

impl AskAiPanel {
    pub fn open(ctx: PanelContext, selected_text: impl Into<String>) -> Self {
        let runner = ctx.runner(PanelKind::AskAi);
        runner.send_event(PanelEvent::Opened {
            panel: PanelKind::AskAi,
        });

        Self {
            selected_text: selected_text.into(),
            agent: ctx.agent,
            document: ctx.document,
            runner,
            question: Mutex::new(String::new()),
            response: RegionCell::default(),
            open: AtomicBool::new(true),
        }
    }

    pub fn set_question(&self, question: impl Into<String>) {
        *self.question.lock() = question.into();
    }

    /// Answer the typed question about the selection.
    ///
    /// The question is cleared only once an answer is shown.
    pub async fn ask(&self) -> RequestOutcome {
        if !self.is_open() {
            return RequestOutcome::Ignored;
        }
        let question = self.question.lock().clone();
        if question.trim().is_empty() {
            return RequestOutcome::Skipped;
        }
        let Some(ticket) = self.runner.begin(Control::Ask) else {
            return RequestOutcome::Ignored;
        };

        let previous = self.response.begin_loading(THINKING);
        match ticket
            .finish(self.agent.ask(&self.selected_text, &question), ASK_FAILED)
            .await
        {
            Ok(answer) => {
                self.response.set(Region::Rendered(answer));
                self.question.lock().clear();
                RequestOutcome::Completed
            }
            Err(_) => {
                self.response.set(previous);
                RequestOutcome::Failed
            }
        }
    }

    /// Translate the selection to concise English.
    pub async fn translate(&self) -> RequestOutcome {
        if !self.is_open() {
            return RequestOutcome::Ignored;
        }
        if self.selected_text.trim().is_empty() {
            return RequestOutcome::Skipped;
        }
        let Some(ticket) = self.runner.begin(Control::Translate) else {
            return RequestOutcome::Ignored;
        };

        let previous = self.response.begin_loading(TRANSLATING);
        match ticket
            .finish(
                self.agent.translate_to_english(&self.selected_text),
                TRANSLATE_FAILED,
            )
            .await
        {
            Ok(translation) => {
                self.response.set(Region::Rendered(translation));
                RequestOutcome::Completed
            }
            Err(_) => {
                self.response.set(previous);
                RequestOutcome::Failed
            }
        }
    }

    /// Replace the displayed response with the user's edit.
    ///
    /// Returns `false` while nothing is rendered (empty or loading).
    pub fn edit_response(&self, text: impl Into<String>) -> bool {
        self.is_open() && self.response.edit_rendered(text.into())
    }

    /// Write the displayed response below the cursor and close.
    pub fn accept(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        let Some(text) = self.response.get().text().map(str::to_string) else {
            return false;
        };

        insert_below_cursor(self.document.as_ref(), &text);
        self.runner.send_event(PanelEvent::Accepted {
            panel: PanelKind::AskAi,
        });
        self.close();
        true
    }

    pub fn view(&self) -> AskView {
        let idle = self.is_open() && self.runner.is_idle();
        AskView {
            selected_text: self.selected_text.clone(),
            question: self.question.lock().clone(),
            response: self.response.get(),
            can_ask: idle,
            can_translate: idle,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            self.runner.send_event(PanelEvent::Closed {
                panel: PanelKind::AskAi,
            });
        }
    }
}

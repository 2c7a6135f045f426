//! Inline completion preview.
//!
//! After the editor has been quiet for a while the text before the cursor is
//! sent for completion and the suggestion is inserted in place as a preview.
//! The next key decides its fate: Alt keeps it, anything else removes it.

use parking_lot::Mutex;
use shared::document::{CursorPos, CursorSide, HostDocument};
use shared::settings::AutocompleteSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;
use crate::AiAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKey {
    /// Alt
    Accept,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    /// A preview of `text` sits at `start` waiting for the next key
    AwaitingInput { start: CursorPos, text: String },
}

struct Inner {
    agent: AiAgent,
    document: Arc<dyn HostDocument>,
    state: Mutex<PreviewState>,
}

pub struct InlineCompletion {
    inner: Arc<Inner>,
    debouncer: Debouncer,
    enabled: bool,
}

impl InlineCompletion {
    pub fn new(
        agent: AiAgent,
        document: Arc<dyn HostDocument>,
        settings: &AutocompleteSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                agent,
                document,
                state: Mutex::new(PreviewState::Idle),
            }),
            debouncer: Debouncer::new(Duration::from_millis(settings.quiet_period_ms)),
            enabled: settings.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> PreviewState {
        self.inner.state.lock().clone()
    }

    /// Call on every document change. Returns the scheduled completion, if any.
    pub fn on_editor_change(&self) -> Option<JoinHandle<()>> {
        if !self.enabled || *self.inner.state.lock() != PreviewState::Idle {
            return None;
        }
        let inner = self.inner.clone();
        Some(self.debouncer.call(async move { inner.fire().await }))
    }

    /// Resolve a pending preview. Returns `false` when there was none.
    pub fn on_key(&self, key: PreviewKey) -> bool {
        let state = std::mem::take(&mut *self.inner.state.lock());
        let PreviewState::AwaitingInput { start, text } = state else {
            return false;
        };

        let end = start.advanced_by(&text);
        match key {
            PreviewKey::Accept => self.inner.document.set_cursor(end),
            PreviewKey::Other => self.inner.document.replace_range("", start, Some(end)),
        }
        true
    }
}

impl Inner {
    /// Cursor and the text before it on the cursor's line
    fn line_prefix(&self) -> (CursorPos, String) {
        let cursor = self.document.cursor(CursorSide::To);
        let prefix = self
            .document
            .line(cursor.line)
            .unwrap_or_default()
            .chars()
            .take(cursor.ch)
            .collect();
        (cursor, prefix)
    }

    async fn fire(&self) {
        if *self.state.lock() != PreviewState::Idle {
            return;
        }
        let (cursor, prefix) = self.line_prefix();
        if prefix.trim().is_empty() {
            return;
        }

        let completion = match self.agent.complete_inline(&prefix).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Inline completion failed");
                return;
            }
        };
        if completion.is_empty() {
            return;
        }
        // The user kept editing while the request ran; the completion no longer fits.
        if self.line_prefix() != (cursor, prefix) {
            tracing::debug!("Document changed during inline completion, preview dropped");
            return;
        }

        // Mark the preview before inserting so the host's change event is ignored.
        {
            let mut state = self.state.lock();
            if *state != PreviewState::Idle {
                return;
            }
            *state = PreviewState::AwaitingInput {
                start: cursor,
                text: completion.clone(),
            };
        }
        self.document.replace_range(&completion, cursor, None);
        tracing::debug!(chars = completion.chars().count(), "Inline preview shown");
    }
}

//! Weekly summary panel with multiple candidate versions.

use parking_lot::Mutex;
use shared::document::HostDocument;
use shared::events::{Control, PanelEvent, PanelKind};
use shared::store::{Subscription, SummaryStore};
use shared::version::{SummaryAction, SummaryVersion};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::{insert_below_cursor, PanelContext};
use crate::request::{RequestOutcome, RequestRunner};
use crate::AiAgent;

const GENERATING: &str = "Generating summary...";
const REGENERATING: &str = "Regenerating summary...";
const FAILURE_NOTICE: &str = "Error generating summary. Please try again.";

/// Snapshot for rendering the panel
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub loading: Option<&'static str>,
    pub versions: Vec<SummaryVersion>,
    pub can_regenerate: bool,
    /// Bumped on every store change; re-render the whole list when it moves
    pub revision: u64,
}

pub struct WeeklySummaryPanel {
    selected_text: String,
    agent: AiAgent,
    document: Arc<dyn HostDocument>,
    runner: RequestRunner,
    store: SummaryStore,
    subscription: Mutex<Option<Subscription>>,
    revision: Arc<AtomicU64>,
    loading: Mutex<Option<&'static str>>,
    open: AtomicBool,
}

impl WeeklySummaryPanel {
    /// Open the panel for `selected_text`. Call [`generate`](Self::generate)
    /// to request the first version.
    pub fn open(ctx: PanelContext, selected_text: impl Into<String>) -> Self {
        let store = SummaryStore::new();
        let revision = Arc::new(AtomicU64::new(0));
        let counter = revision.clone();
        let subscription = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let runner = ctx.runner(PanelKind::WeeklySummary);
        runner.send_event(PanelEvent::Opened {
            panel: PanelKind::WeeklySummary,
        });

        Self {
            selected_text: selected_text.into(),
            agent: ctx.agent,
            document: ctx.document,
            runner,
            store,
            subscription: Mutex::new(Some(subscription)),
            revision,
            loading: Mutex::new(None),
            open: AtomicBool::new(true),
        }
    }

    pub async fn generate(&self) -> RequestOutcome {
        self.request(Control::Generate, GENERATING).await
    }

    /// Request another candidate; earlier versions are kept.
    pub async fn regenerate(&self) -> RequestOutcome {
        self.request(Control::Regenerate, REGENERATING).await
    }

    async fn request(&self, control: Control, label: &'static str) -> RequestOutcome {
        if !self.is_open() {
            return RequestOutcome::Ignored;
        }
        if self.selected_text.trim().is_empty() {
            return RequestOutcome::Skipped;
        }
        let Some(ticket) = self.runner.begin(control) else {
            return RequestOutcome::Ignored;
        };

        *self.loading.lock() = Some(label);
        let result = ticket
            .finish(
                self.agent.generate_weekly_summary(&self.selected_text),
                FAILURE_NOTICE,
            )
            .await;
        *self.loading.lock() = None;

        match result {
            Ok(_) if !self.is_open() => {
                tracing::debug!("Summary arrived after close, discarded");
                RequestOutcome::Ignored
            }
            Ok(content) => {
                self.store.add(content);
                RequestOutcome::Completed
            }
            Err(_) => RequestOutcome::Failed,
        }
    }

    /// Apply the user's edit to one version.
    pub fn edit(&self, id: Uuid, content: impl Into<String>) -> bool {
        self.store.update(id, content)
    }

    pub fn delete(&self, id: Uuid) -> bool {
        self.store.delete(id).is_some()
    }

    /// Write one version below the cursor and close the panel.
    pub fn accept(&self, id: Uuid) -> bool {
        if !self.is_open() {
            return false;
        }
        let Some(version) = self.store.get(id) else {
            return false;
        };

        insert_below_cursor(self.document.as_ref(), &version.content);
        self.runner.send_event(PanelEvent::Accepted {
            panel: PanelKind::WeeklySummary,
        });
        self.close();
        true
    }

    /// Dispatch an action coming from a version's controls.
    pub async fn handle(&self, action: SummaryAction) -> bool {
        match action {
            SummaryAction::Accept { id } => self.accept(id),
            SummaryAction::Delete { id } => self.delete(id),
            SummaryAction::Edit { id, content } => self.edit(id, content),
            SummaryAction::Regenerate => self.regenerate().await == RequestOutcome::Completed,
        }
    }

    pub fn view(&self) -> SummaryView {
        SummaryView {
            loading: *self.loading.lock(),
            versions: self.store.list(),
            can_regenerate: self.is_open() && self.runner.is_idle(),
            revision: self.revision.load(Ordering::SeqCst),
        }
    }

    pub fn store(&self) -> &SummaryStore {
        &self.store
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
        self.runner.send_event(PanelEvent::Closed {
            panel: PanelKind::WeeklySummary,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, ScriptedClient};
    use shared::completion::CompletionError;
    use shared::document::{CursorPos, TextBuffer};
    use tokio::sync::{mpsc, Notify};

    const NOTES: &str = "mon: shipped login\ntue: fixed sync bug";

    fn doc() -> Arc<TextBuffer> {
        Arc::new(TextBuffer::new("l0\nl1\nl2\nl3\nl4\nl5\nl6"))
    }

    #[tokio::test]
    async fn test_generate_then_regenerate_keeps_versions() {
        let client = ScriptedClient::replying(["first", "second"]);
        let (ctx, _) = context(client.clone(), doc());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);

        assert_eq!(panel.generate().await, RequestOutcome::Completed);
        assert_eq!(panel.regenerate().await, RequestOutcome::Completed);

        let view = panel.view();
        let contents: Vec<_> = view.versions.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(view.revision, 2);
        assert!(view.loading.is_none());
        assert!(client.prompts()[0].contains(NOTES));
    }

    #[tokio::test]
    async fn test_failed_regenerate_keeps_previous_content() {
        let client = ScriptedClient::new(vec![
            Ok("first".into()),
            Err(CompletionError::Status(500)),
        ]);
        let (ctx, notifier) = context(client, doc());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);

        panel.generate().await;
        let before = panel.view();
        assert_eq!(panel.regenerate().await, RequestOutcome::Failed);

        let after = panel.view();
        assert_eq!(after.versions, before.versions);
        assert_eq!(after.revision, before.revision);
        assert!(after.loading.is_none());
        assert!(after.can_regenerate);
        assert!(panel.is_open());
        assert_eq!(notifier.messages(), vec![FAILURE_NOTICE]);
    }

    #[tokio::test]
    async fn test_second_click_while_loading_is_ignored() {
        let hold = Arc::new(Notify::new());
        let client = ScriptedClient::held(vec![Ok("only".into())], hold.clone());
        let (ctx, _) = context(client.clone(), doc());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);

        let (first, second, _) = tokio::join!(
            panel.regenerate(),
            async {
                tokio::task::yield_now().await;
                let view = panel.view();
                assert_eq!(view.loading, Some(REGENERATING));
                assert!(!view.can_regenerate);
                panel.regenerate().await
            },
            async {
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                hold.notify_one();
            }
        );

        assert_eq!(first, RequestOutcome::Completed);
        assert_eq!(second, RequestOutcome::Ignored);
        assert_eq!(client.calls(), 1);
        assert!(panel.view().can_regenerate);
    }

    #[tokio::test]
    async fn test_result_after_close_is_discarded() {
        let hold = Arc::new(Notify::new());
        let client = ScriptedClient::held(vec![Ok("late".into())], hold.clone());
        let (ctx, _) = context(client, doc());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);

        let (outcome, _) = tokio::join!(panel.generate(), async {
            tokio::task::yield_now().await;
            panel.close();
            hold.notify_one();
        });

        assert_eq!(outcome, RequestOutcome::Ignored);
        assert!(panel.store().is_empty());
        assert_eq!(panel.view().revision, 0);
        assert!(panel.view().loading.is_none());
    }

    #[tokio::test]
    async fn test_edit_and_delete_versions() {
        let client = ScriptedClient::replying(["draft A", "draft B"]);
        let (ctx, _) = context(client, doc());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);
        panel.generate().await;
        panel.regenerate().await;

        let ids: Vec<Uuid> = panel.view().versions.iter().map(|v| v.id).collect();
        assert!(panel.edit(ids[1], "draft B, edited"));
        assert!(panel.handle(SummaryAction::Delete { id: ids[0] }).await);
        assert!(!panel.delete(ids[0]));

        let view = panel.view();
        assert_eq!(view.versions.len(), 1);
        assert_eq!(view.versions[0].content, "draft B, edited");
    }

    #[tokio::test]
    async fn test_accept_inserts_below_cursor_and_closes() {
        let document = doc();
        document.set_cursor(CursorPos::new(5, 0));
        let client = ScriptedClient::replying(["the summary"]);
        let (ctx, _) = context(client, document.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let panel = WeeklySummaryPanel::open(ctx.with_events(tx), NOTES);
        panel.generate().await;

        let id = panel.view().versions[0].id;
        assert!(panel.accept(id));

        assert_eq!(
            document.text(),
            "l0\nl1\nl2\nl3\nl4\n\n\nthe summaryl5\nl6"
        );
        assert!(!panel.is_open());
        assert_eq!(panel.store().listener_count(), 0);
        assert!(!panel.accept(id));
        assert_eq!(panel.generate().await, RequestOutcome::Ignored);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events.first(), Some(PanelEvent::Opened { .. })));
        assert!(matches!(events[events.len() - 2], PanelEvent::Accepted { .. }));
        assert!(matches!(events.last(), Some(PanelEvent::Closed { .. })));
    }

    #[tokio::test]
    async fn test_accept_unknown_id_is_noop() {
        let document = doc();
        let (ctx, _) = context(ScriptedClient::failing(), document.clone());
        let panel = WeeklySummaryPanel::open(ctx, NOTES);

        assert!(!panel.accept(Uuid::new_v4()));
        assert!(panel.is_open());
        assert_eq!(document.text(), "l0\nl1\nl2\nl3\nl4\nl5\nl6");
    }

    #[tokio::test]
    async fn test_empty_selection_is_skipped() {
        let client = ScriptedClient::replying(["unused"]);
        let (ctx, _) = context(client.clone(), doc());
        let panel = WeeklySummaryPanel::open(ctx, "   ");

        assert_eq!(panel.generate().await, RequestOutcome::Skipped);
        assert_eq!(client.calls(), 0);
    }
}

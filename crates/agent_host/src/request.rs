//! Per-panel request gating.
//!
//! A panel owns one [`RequestRunner`]. At most one completion request is in
//! flight per panel; triggers arriving while it is busy are rejected rather
//! than queued. The gate is held by a [`RequestTicket`], so every exit path
//! (success, failure, early return) re-enables the panel's controls.

use parking_lot::Mutex;
use shared::completion::CompletionError;
use shared::events::{Control, Notifier, PanelEvent, PanelKind};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use uuid::Uuid;

/// What happened to a triggered action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Response received and displayed
    Completed,
    /// Request failed; previous content restored and the user notified
    Failed,
    /// Panel busy or closed; nothing was sent
    Ignored,
    /// Input was empty; nothing was sent
    Skipped,
}

#[derive(Debug, Default)]
struct RequestGate {
    in_flight: Mutex<Option<Control>>,
}

impl RequestGate {
    fn try_acquire(&self, control: Control) -> Option<GateGuard<'_>> {
        let mut in_flight = self.in_flight.lock();
        if in_flight.is_some() {
            return None;
        }
        *in_flight = Some(control);
        Some(GateGuard { gate: self })
    }
}

struct GateGuard<'a> {
    gate: &'a RequestGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        *self.gate.in_flight.lock() = None;
    }
}

/// Runs completion requests for one panel.
pub struct RequestRunner {
    panel: PanelKind,
    gate: RequestGate,
    notifier: Arc<dyn Notifier>,
    /// Channel for sending panel events
    event_sender: Option<mpsc::UnboundedSender<PanelEvent>>,
}

impl RequestRunner {
    pub fn new(panel: PanelKind, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            panel,
            gate: RequestGate::default(),
            notifier,
            event_sender: None,
        }
    }

    pub fn with_events(mut self, event_sender: Option<mpsc::UnboundedSender<PanelEvent>>) -> Self {
        self.event_sender = event_sender;
        self
    }

    pub fn panel(&self) -> PanelKind {
        self.panel
    }

    /// Control currently waiting on a response, if any
    pub fn in_flight(&self) -> Option<Control> {
        *self.gate.in_flight.lock()
    }

    /// Whether a trigger would be accepted right now
    pub fn is_idle(&self) -> bool {
        self.in_flight().is_none()
    }

    /// Claim the panel for one request. Returns `None` while another request
    /// from this panel is in flight.
    pub fn begin(&self, control: Control) -> Option<RequestTicket<'_>> {
        let Some(guard) = self.gate.try_acquire(control) else {
            tracing::debug!(panel = ?self.panel, ?control, "panel busy, trigger ignored");
            return None;
        };

        let request_id = Uuid::new_v4();
        tracing::info!(panel = ?self.panel, ?control, %request_id, "completion request started");
        self.send_event(PanelEvent::RequestStarted {
            panel: self.panel,
            request_id,
            control,
        });

        Some(RequestTicket {
            runner: self,
            _guard: guard,
            request_id,
            started: Instant::now(),
        })
    }

    pub fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }

    pub fn send_event(&self, event: PanelEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

/// Proof that the panel gate is held for one request.
pub struct RequestTicket<'a> {
    runner: &'a RequestRunner,
    _guard: GateGuard<'a>,
    request_id: Uuid,
    started: Instant,
}

impl RequestTicket<'_> {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Await the request, report the outcome, and release the gate.
    ///
    /// On failure `failure_notice` is shown to the user.
    pub async fn finish<F>(self, request: F, failure_notice: &str) -> Result<String, CompletionError>
    where
        F: Future<Output = Result<String, CompletionError>>,
    {
        let result = request.await;
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let panel = self.runner.panel;

        match &result {
            Ok(_) => {
                tracing::info!(?panel, request_id = %self.request_id, duration_ms, "completion request succeeded");
                self.runner.send_event(PanelEvent::RequestSucceeded {
                    panel,
                    request_id: self.request_id,
                    duration_ms,
                });
            }
            Err(e) => {
                tracing::warn!(?panel, request_id = %self.request_id, duration_ms, error = %e, "completion request failed");
                self.runner.send_event(PanelEvent::RequestFailed {
                    panel,
                    request_id: self.request_id,
                    error: e.to_string(),
                    duration_ms,
                });
                self.runner.notify(failure_notice);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    fn runner() -> (RequestRunner, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (RequestRunner::new(PanelKind::AskAi, notifier.clone()), notifier)
    }

    #[test]
    fn test_single_in_flight() {
        let (runner, _) = runner();
        let ticket = runner.begin(Control::Ask).unwrap();
        assert_eq!(runner.in_flight(), Some(Control::Ask));
        assert!(runner.begin(Control::Translate).is_none());
        assert!(runner.begin(Control::Ask).is_none());

        drop(ticket);
        assert!(runner.is_idle());
        assert!(runner.begin(Control::Translate).is_some());
    }

    #[tokio::test]
    async fn test_finish_releases_gate_on_failure() {
        let (runner, notifier) = runner();
        let ticket = runner.begin(Control::Ask).unwrap();

        let result = ticket
            .finish(async { Err(CompletionError::Status(502)) }, "request failed")
            .await;

        assert_eq!(result, Err(CompletionError::Status(502)));
        assert!(runner.is_idle());
        assert_eq!(notifier.messages(), vec!["request failed"]);
    }

    #[tokio::test]
    async fn test_event_sending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (runner, notifier) = runner();
        let runner = runner.with_events(Some(tx));

        let ticket = runner.begin(Control::Translate).unwrap();
        let id = ticket.request_id();
        let _ = ticket.finish(async { Ok("done".to_string()) }, "unused").await;

        let started = rx.recv().await;
        assert!(matches!(
            started,
            Some(PanelEvent::RequestStarted { request_id, control: Control::Translate, .. }) if request_id == id
        ));
        let finished = rx.recv().await;
        assert!(matches!(finished, Some(PanelEvent::RequestSucceeded { .. })));
        assert!(notifier.messages().is_empty());
    }
}

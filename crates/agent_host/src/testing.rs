//! Test doubles shared by the panel and agent tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::completion::{CompletionClient, CompletionError};
use shared::document::TextBuffer;
use shared::events::Notifier;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::panels::PanelContext;
use crate::AiAgent;

/// Completion client answering from a fixed script.
///
/// Once the script runs out every call fails with a transport error.
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
    hold: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            hold: None,
        })
    }

    pub fn replying<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Vec::new())
    }

    /// Every call blocks until `hold` is notified.
    pub fn held(replies: Vec<Result<String, CompletionError>>, hold: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            hold: Some(hold),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("connection refused".into())))
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub(crate) fn context(
    client: Arc<ScriptedClient>,
    document: Arc<TextBuffer>,
) -> (PanelContext, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = PanelContext::new(AiAgent::new(client), document, notifier.clone());
    (ctx, notifier)
}

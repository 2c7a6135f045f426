//! Agent Host - writing assistant core
//!
//! This crate provides:
//! - The AI agent that turns editor text into prompts and completions
//! - Panel controllers (weekly summary, text analysis, ask AI, snippet console)
//! - Per-panel request gating with lifecycle events
//! - Debounced inline completion preview
//! - Editor commands

pub mod autocomplete;
pub mod commands;
pub mod debounce;
pub mod panels;
pub mod prompts;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use autocomplete::{InlineCompletion, PreviewKey, PreviewState};
pub use debounce::Debouncer;
pub use panels::{
    AskAiPanel, PanelContext, Region, SnippetConsole, TextAnalysisPanel, WeeklySummaryPanel,
};
pub use panels::snippet_console::{LogLevel, LogSink, SnippetEvaluator};
pub use request::{RequestOutcome, RequestRunner};

use shared::completion::{CompletionClient, CompletionError};
use shared::settings::Language;
use std::sync::Arc;

/// Binds a completion client to a response language.
///
/// Each method renders one prompt and issues exactly one request.
#[derive(Clone)]
pub struct AiAgent {
    client: Arc<dyn CompletionClient>,
    language: Language,
}

impl AiAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn generate_weekly_summary(&self, text: &str) -> Result<String, CompletionError> {
        self.client
            .complete(&prompts::weekly_summary_prompt(text, self.language))
            .await
    }

    pub async fn analyze_text(&self, text: &str) -> Result<String, CompletionError> {
        self.client
            .complete(&prompts::analysis_prompt(text, self.language))
            .await
    }

    pub async fn process_modification(
        &self,
        original: &str,
        suggestions: &str,
    ) -> Result<String, CompletionError> {
        self.client
            .complete(&prompts::modification_prompt(original, suggestions))
            .await
    }

    pub async fn ask(&self, original: &str, question: &str) -> Result<String, CompletionError> {
        self.client
            .complete(&prompts::question_prompt(original, question))
            .await
    }

    pub async fn translate_to_english(&self, text: &str) -> Result<String, CompletionError> {
        self.client.complete(&prompts::translation_prompt(text)).await
    }

    pub async fn complete_inline(&self, prefix: &str) -> Result<String, CompletionError> {
        self.client
            .complete(&prompts::inline_completion_prompt(prefix))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    #[tokio::test]
    async fn test_one_request_per_action() {
        let client = ScriptedClient::replying(["summary", "answer"]);
        let agent = AiAgent::new(client.clone()).with_language(Language::En);

        assert_eq!(agent.generate_weekly_summary("notes").await.unwrap(), "summary");
        assert_eq!(agent.ask("notes", "why?").await.unwrap(), "answer");

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Please write the summary in English"));
        assert!(prompts[1].contains("问题：why?"));
    }

    #[tokio::test]
    async fn test_errors_are_returned_not_rendered() {
        let client = ScriptedClient::failing();
        let agent = AiAgent::new(client);

        let result = agent.translate_to_english("你好").await;
        assert!(matches!(result, Err(CompletionError::Transport(_))));
    }
}

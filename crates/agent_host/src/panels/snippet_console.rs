//! Live snippet console: evaluates code as it is typed and shows the captured log lines.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::events::{PanelEvent, PanelKind};
use shared::settings::PluginSettings;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Log => "LOG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an evaluated snippet writes its log output
pub trait LogSink: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);
}

/// Collects lines as `[LEVEL] message`.
#[derive(Debug, Default)]
pub struct CapturedLogs {
    lines: Mutex<Vec<String>>,
}

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn joined(&self) -> String {
        self.lines.lock().join("\n")
    }
}

impl LogSink for CapturedLogs {
    fn write(&self, level: LogLevel, message: &str) {
        self.lines.lock().push(format!("[{}] {}", level, message));
    }
}

/// Runs one snippet. Log output goes to `console`, never to a global logger.
#[async_trait]
pub trait SnippetEvaluator: Send + Sync {
    async fn evaluate(&self, code: &str, console: &dyn LogSink) -> Result<()>;
}

pub struct SnippetConsole {
    evaluator: Arc<dyn SnippetEvaluator>,
    debouncer: Debouncer,
    output: Arc<Mutex<String>>,
    open: Arc<AtomicBool>,
    events: Option<mpsc::UnboundedSender<PanelEvent>>,
}

impl SnippetConsole {
    pub fn open(
        evaluator: Arc<dyn SnippetEvaluator>,
        quiet: Duration,
        events: Option<mpsc::UnboundedSender<PanelEvent>>,
    ) -> Self {
        let console = Self {
            evaluator,
            debouncer: Debouncer::new(quiet),
            output: Arc::new(Mutex::new(String::new())),
            open: Arc::new(AtomicBool::new(true)),
            events,
        };
        console.send_event(PanelEvent::Opened {
            panel: PanelKind::SnippetConsole,
        });
        console
    }

    /// Open with the configured `snippet_debounce_ms` quiet period.
    pub fn from_settings(
        evaluator: Arc<dyn SnippetEvaluator>,
        settings: &PluginSettings,
        events: Option<mpsc::UnboundedSender<PanelEvent>>,
    ) -> Self {
        Self::open(
            evaluator,
            Duration::from_millis(settings.snippet_debounce_ms),
            events,
        )
    }

    pub fn quiet_period(&self) -> Duration {
        self.debouncer.quiet_period()
    }

    /// Feed the current editor contents; evaluation waits for the quiet period.
    pub fn on_input(&self, code: impl Into<String>) -> Option<JoinHandle<()>> {
        if !self.is_open() {
            return None;
        }
        let code = code.into();
        let evaluator = self.evaluator.clone();
        let output = self.output.clone();
        let open = self.open.clone();

        Some(self.debouncer.call(async move {
            let rendered = render(evaluator.as_ref(), &code).await;
            if open.load(Ordering::SeqCst) {
                *output.lock() = rendered;
            }
        }))
    }

    /// Evaluate immediately, dropping any pending debounced run.
    pub async fn run_now(&self, code: &str) -> String {
        self.debouncer.cancel();
        let rendered = render(self.evaluator.as_ref(), code).await;
        if self.is_open() {
            *self.output.lock() = rendered.clone();
        }
        rendered
    }

    pub fn output(&self) -> String {
        self.output.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        self.debouncer.cancel();
        self.output.lock().clear();
        self.send_event(PanelEvent::Closed {
            panel: PanelKind::SnippetConsole,
        });
    }

    fn send_event(&self, event: PanelEvent) {
        if let Some(ref tx) = self.events {
            let _ = tx.send(event);
        }
    }
}

async fn render(evaluator: &dyn SnippetEvaluator, code: &str) -> String {
    let logs = CapturedLogs::default();
    match evaluator.evaluate(code, &logs).await {
        Ok(()) => logs.joined(),
        Err(e) => {
            tracing::debug!(error = %e, "Snippet evaluation failed");
            format!("Error: {}", e)
        }
    }
}

use agent_host::commands::{self, COMMANDS};
use agent_host::{
    AiAgent, AskAiPanel, PanelContext, RequestOutcome, TextAnalysisPanel, WeeklySummaryPanel,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use providers::LocalCompletionClient;
use shared::document::TextBuffer;
use shared::events::{LogNotifier, PanelEvent};
use shared::settings::{Language, PluginSettings};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "writing-helper", about = "AI writing assistant for Markdown notes")]
struct Cli {
    /// Completion endpoint; overrides settings.json
    #[arg(long, env = "COMPLETION_ENDPOINT")]
    endpoint: Option<String>,

    /// Response language (zh or en)
    #[arg(long)]
    language: Option<Language>,

    /// Note to work on; stdin when omitted. The whole note is the selection.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write the edited note back to --input instead of printing it
    #[arg(long, requires = "input")]
    write: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate weekly summary candidates
    Summary {
        #[arg(long, default_value_t = 1)]
        versions: usize,
        /// Insert candidate N (1-based) below the note
        #[arg(long)]
        accept: Option<usize>,
    },
    /// Review the note and print suggestions
    Analyze {
        /// Rewrite by the suggestions and replace the note
        #[arg(long)]
        apply: bool,
    },
    /// Ask a question about the note
    Ask {
        question: String,
        #[arg(long)]
        accept: bool,
    },
    /// Translate the note to English
    Translate {
        #[arg(long)]
        accept: bool,
    },
    /// Wrap the note in the weekly summary template
    Template,
    /// List editor commands
    Commands,
    /// Show the effective settings
    Config {
        /// Write them to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = apply_overrides(settings::load_or_default(), &cli);

    match cli.command {
        Command::Commands => {
            for command in COMMANDS {
                println!("{:<22} {}", command.id, command.name);
            }
            return Ok(());
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if save {
                let path = settings::config_path().context("no config directory on this platform")?;
                settings::save_to(&path, &settings)?;
                eprintln!("saved {}", path.display());
            }
            return Ok(());
        }
        _ => {}
    }

    let note = read_note(cli.input.as_ref())?;
    let document = Arc::new(TextBuffer::new(note.clone()));
    document.select_all();

    let client = Arc::new(LocalCompletionClient::from_settings(&settings.completion));
    let agent = AiAgent::new(client).with_language(settings.language);
    let (tx, rx) = mpsc::unbounded_channel();
    let events = tokio::spawn(log_events(rx));
    let ctx = PanelContext::new(agent, document.clone(), Arc::new(LogNotifier)).with_events(tx);

    run(cli.command, ctx, document.as_ref(), note.clone()).await?;
    join_event_logger(events).await;

    let edited = document.text();
    if edited != note {
        match (&cli.input, cli.write) {
            (Some(path), true) => {
                fs::write(path, &edited).with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "Note updated");
            }
            _ => println!("{}", edited),
        }
    }
    Ok(())
}

/// Drive one panel flow. The context is dropped on return, which ends the event stream.
async fn run(command: Command, ctx: PanelContext, document: &TextBuffer, note: String) -> Result<()> {
    match command {
        Command::Summary { versions, accept } => {
            let panel = WeeklySummaryPanel::open(ctx, note);
            check(panel.generate().await)?;
            for _ in 1..versions {
                check(panel.regenerate().await)?;
            }
            let view = panel.view();
            for (i, version) in view.versions.iter().enumerate() {
                println!("--- version {} ({})\n{}\n", i + 1, version.formatted_time(), version.content);
            }
            if let Some(n) = accept {
                let Some(version) = n.checked_sub(1).and_then(|i| view.versions.get(i)) else {
                    bail!("no version {}", n);
                };
                panel.accept(version.id);
            }
            panel.close();
        }
        Command::Analyze { apply } => {
            let panel = TextAnalysisPanel::show(ctx, note).await;
            let Some(suggestions) = panel.view().suggestions.text().map(str::to_string) else {
                bail!("analysis failed");
            };
            println!("{}", suggestions);
            if apply {
                check(panel.modify().await)?;
                panel.apply();
            }
            panel.close();
        }
        Command::Ask { question, accept } => {
            let panel = AskAiPanel::open(ctx, note);
            panel.set_question(question);
            check(panel.ask().await)?;
            finish_ask(&panel, accept);
        }
        Command::Translate { accept } => {
            let panel = AskAiPanel::open(ctx, note);
            check(panel.translate().await)?;
            finish_ask(&panel, accept);
        }
        Command::Template => commands::insert_weekly_template(document),
        Command::Commands | Command::Config { .. } => {}
    }
    Ok(())
}

/// Layer the command line (and `COMPLETION_ENDPOINT`, via clap) over the file settings.
fn apply_overrides(mut settings: PluginSettings, cli: &Cli) -> PluginSettings {
    if let Some(endpoint) = &cli.endpoint {
        settings.completion.endpoint = endpoint.clone();
    }
    if let Some(language) = cli.language {
        settings.language = language;
    }
    settings
}

fn read_note(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut note = String::new();
            io::stdin().read_to_string(&mut note).context("reading stdin")?;
            Ok(note)
        }
    }
}

fn check(outcome: RequestOutcome) -> Result<()> {
    match outcome {
        RequestOutcome::Completed => Ok(()),
        RequestOutcome::Skipped => bail!("nothing to send: the note is empty"),
        other => bail!("request {:?}", other),
    }
}

fn finish_ask(panel: &AskAiPanel, accept: bool) {
    if let Some(response) = panel.view().response.text() {
        println!("{}", response);
    }
    if accept {
        panel.accept();
    }
    panel.close();
}

/// Wait for the event logger to drain. Returns `false` if it panicked or was cancelled.
async fn join_event_logger(handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Event logger stopped abnormally");
            false
        }
    }
}

async fn log_events(mut rx: mpsc::UnboundedReceiver<PanelEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            PanelEvent::RequestSucceeded { panel, duration_ms, .. } => {
                tracing::info!(panel = panel.display_name(), duration_ms, "Request completed");
            }
            PanelEvent::RequestFailed { panel, error, .. } => {
                tracing::warn!(panel = panel.display_name(), %error, "Request failed");
            }
            other => tracing::debug!(?other, "Panel event"),
        }
    }
}

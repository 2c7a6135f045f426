//! Panel controllers.
//!
//! Every panel follows the same protocol: a trigger claims the panel's
//! request gate and puts a loading indicator in its output region, exactly one
//! completion request is issued, and the region then shows either the response
//! or, on failure, whatever it showed before. Rendering is left to the front
//! end, which reads the `view()` snapshots.

pub mod ask_ai;
pub mod snippet_console;
pub mod text_analysis;
pub mod weekly_summary;

pub use ask_ai::AskAiPanel;
pub use snippet_console::SnippetConsole;
pub use text_analysis::TextAnalysisPanel;
pub use weekly_summary::WeeklySummaryPanel;

use parking_lot::Mutex;
use shared::document::{CursorSide, HostDocument};
use shared::events::{Notifier, PanelEvent, PanelKind};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::request::RequestRunner;
use crate::AiAgent;

/// Collaborators every panel is opened with
#[derive(Clone)]
pub struct PanelContext {
    pub agent: AiAgent,
    pub document: Arc<dyn HostDocument>,
    pub notifier: Arc<dyn Notifier>,
    pub events: Option<mpsc::UnboundedSender<PanelEvent>>,
}

impl PanelContext {
    pub fn new(
        agent: AiAgent,
        document: Arc<dyn HostDocument>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            agent,
            document,
            notifier,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<PanelEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn runner(&self, panel: PanelKind) -> RequestRunner {
        RequestRunner::new(panel, self.notifier.clone()).with_events(self.events.clone())
    }
}

/// Content of one output area of a panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Empty,
    Loading(&'static str),
    Rendered(String),
}

impl Region {
    /// Displayed text, if a response is shown
    pub fn text(&self) -> Option<&str> {
        match self {
            Region::Rendered(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Region::Loading(_))
    }
}

/// Output region that can fall back to its previous content.
#[derive(Debug, Default)]
struct RegionCell(Mutex<Region>);

impl RegionCell {
    fn get(&self) -> Region {
        self.0.lock().clone()
    }

    fn set(&self, region: Region) {
        *self.0.lock() = region;
    }

    /// Swap in edited text; only a rendered response can be edited.
    fn edit_rendered(&self, text: String) -> bool {
        let mut region = self.0.lock();
        match &mut *region {
            Region::Rendered(current) => {
                *current = text;
                true
            }
            _ => false,
        }
    }

    /// Show a loading indicator, returning what was displayed before.
    fn begin_loading(&self, label: &'static str) -> Region {
        std::mem::replace(&mut *self.0.lock(), Region::Loading(label))
    }
}

/// Insert `"\n\n" + content` at the end of the current selection.
fn insert_below_cursor(document: &dyn HostDocument, content: &str) {
    let to = document.cursor(CursorSide::To);
    document.replace_range(&format!("\n\n{}", content), to, None);
}

//! Editor commands exposed to the host.

use shared::document::{CursorSide, HostDocument};
use shared::events::PanelKind;

/// What a command does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    /// Insert the weekly summary template at the cursor
    InsertTemplate,
    OpenPanel(PanelKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCommand {
    pub id: &'static str,
    pub name: &'static str,
    pub action: CommandAction,
}

pub const COMMANDS: &[EditorCommand] = &[
    EditorCommand {
        id: "weekly-summary",
        name: "Create Weekly Summary",
        action: CommandAction::InsertTemplate,
    },
    EditorCommand {
        id: "weekly-summary-panel",
        name: "Generate Weekly Summary with AI",
        action: CommandAction::OpenPanel(PanelKind::WeeklySummary),
    },
    EditorCommand {
        id: "text-analysis",
        name: "Analyze Selected Text",
        action: CommandAction::OpenPanel(PanelKind::TextAnalysis),
    },
    EditorCommand {
        id: "ask-ai",
        name: "Ask AI about Selection",
        action: CommandAction::OpenPanel(PanelKind::AskAi),
    },
    EditorCommand {
        id: "snippet-console",
        name: "Open Snippet Console",
        action: CommandAction::OpenPanel(PanelKind::SnippetConsole),
    },
];

pub fn find_command(id: &str) -> Option<&'static EditorCommand> {
    COMMANDS.iter().find(|c| c.id == id)
}

pub fn weekly_template(selection: &str) -> String {
    format!(
        "# Weekly Summary\n\nThis is a summary of the week:\n\n{}",
        selection
    )
}

/// Insert the weekly template, wrapping a copy of the selection, at the cursor.
///
/// The selection itself is left in place.
pub fn insert_weekly_template(document: &dyn HostDocument) {
    let selection = document.selection();
    let at = document.cursor(CursorSide::To);
    document.replace_range(&weekly_template(&selection), at, None);
    tracing::debug!(chars = selection.chars().count(), "Inserted weekly template");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::document::{CursorPos, TextBuffer};

    #[test]
    fn test_registry_ids_are_unique() {
        let mut ids: Vec<_> = COMMANDS.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), COMMANDS.len());
        assert_eq!(
            find_command("ask-ai").map(|c| c.action),
            Some(CommandAction::OpenPanel(PanelKind::AskAi))
        );
        assert!(find_command("nope").is_none());
    }

    #[test]
    fn test_template_wraps_selection() {
        let doc = TextBuffer::new("before\nmon: login\nafter");
        doc.select(CursorPos::new(1, 0), CursorPos::new(1, 10));

        insert_weekly_template(&doc);

        assert_eq!(
            doc.text(),
            "before\nmon: login# Weekly Summary\n\nThis is a summary of the week:\n\nmon: login\nafter"
        );
    }

    #[test]
    fn test_template_at_cursor_without_selection() {
        let doc = TextBuffer::new("notes");
        doc.set_cursor(CursorPos::new(0, 5));

        insert_weekly_template(&doc);

        assert_eq!(
            doc.text(),
            "notes# Weekly Summary\n\nThis is a summary of the week:\n\n"
        );
    }
}

//! Host document port.
//!
//! The editor is only reached through [`HostDocument`]; [`TextBuffer`] is the
//! in-memory implementation used by the CLI and by tests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Zero-based line and character position. `ch` counts chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CursorPos {
    pub line: usize,
    pub ch: usize,
}

impl CursorPos {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }

    /// Position just past `text` if it were inserted here
    pub fn advanced_by(self, text: &str) -> CursorPos {
        match text.rfind('\n') {
            Some(last) => CursorPos {
                line: self.line + text.matches('\n').count(),
                ch: text[last + 1..].chars().count(),
            },
            None => CursorPos {
                line: self.line,
                ch: self.ch + text.chars().count(),
            },
        }
    }
}

/// Which end of the selection to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorSide {
    From,
    To,
}

pub trait HostDocument: Send + Sync {
    /// Currently selected text (empty when nothing is selected)
    fn selection(&self) -> String;

    fn cursor(&self, side: CursorSide) -> CursorPos;

    fn line(&self, line: usize) -> Option<String>;

    /// Replace `from..to` with `text`; `to = None` inserts at `from`.
    fn replace_range(&self, text: &str, from: CursorPos, to: Option<CursorPos>);

    /// Replace the selection and place the cursor after the new text.
    fn replace_selection(&self, text: &str);

    fn set_cursor(&self, pos: CursorPos);
}

#[derive(Debug)]
struct BufferState {
    text: String,
    anchor: CursorPos,
    head: CursorPos,
}

impl BufferState {
    fn clamp(&self, pos: CursorPos) -> CursorPos {
        let last_line = self.text.matches('\n').count();
        let line = pos.line.min(last_line);
        let len = self.text.split('\n').nth(line).map_or(0, |l| l.chars().count());
        CursorPos::new(line, pos.ch.min(len))
    }

    fn offset(&self, pos: CursorPos) -> usize {
        let pos = self.clamp(pos);
        let line_start: usize = self
            .text
            .split('\n')
            .take(pos.line)
            .map(|l| l.len() + 1)
            .sum();
        let line = self.text[line_start..].split('\n').next().unwrap_or("");
        let within = line
            .char_indices()
            .nth(pos.ch)
            .map_or(line.len(), |(i, _)| i);
        line_start + within
    }

    fn ordered(&self) -> (CursorPos, CursorPos) {
        let (a, b) = (self.clamp(self.anchor), self.clamp(self.head));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Plain-text document with a single selection.
#[derive(Debug)]
pub struct TextBuffer {
    state: Mutex<BufferState>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(BufferState {
                text: text.into(),
                anchor: CursorPos::default(),
                head: CursorPos::default(),
            }),
        }
    }

    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn line_count(&self) -> usize {
        self.state.lock().text.matches('\n').count() + 1
    }

    /// Position after the last character
    pub fn end(&self) -> CursorPos {
        let state = self.state.lock();
        state.clamp(CursorPos::new(usize::MAX, usize::MAX))
    }

    pub fn select(&self, anchor: CursorPos, head: CursorPos) {
        let mut state = self.state.lock();
        state.anchor = state.clamp(anchor);
        state.head = state.clamp(head);
    }

    pub fn select_all(&self) {
        let end = self.end();
        self.select(CursorPos::default(), end);
    }
}

impl Default for CursorPos {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl HostDocument for TextBuffer {
    fn selection(&self) -> String {
        let state = self.state.lock();
        let (from, to) = state.ordered();
        let (start, end) = (state.offset(from), state.offset(to));
        state.text[start..end].to_string()
    }

    fn cursor(&self, side: CursorSide) -> CursorPos {
        let state = self.state.lock();
        let (from, to) = state.ordered();
        match side {
            CursorSide::From => from,
            CursorSide::To => to,
        }
    }

    fn line(&self, line: usize) -> Option<String> {
        self.state.lock().text.split('\n').nth(line).map(str::to_string)
    }

    fn replace_range(&self, text: &str, from: CursorPos, to: Option<CursorPos>) {
        let mut state = self.state.lock();
        let start = state.offset(from);
        let end = to.map_or(start, |to| state.offset(to)).max(start);
        state.text.replace_range(start..end, text);
    }

    fn replace_selection(&self, text: &str) {
        let mut state = self.state.lock();
        let (from, to) = state.ordered();
        let (start, end) = (state.offset(from), state.offset(to));
        state.text.replace_range(start..end, text);
        let after = from.advanced_by(text);
        state.anchor = after;
        state.head = after;
    }

    fn set_cursor(&self, pos: CursorPos) {
        let mut state = self.state.lock();
        let pos = state.clamp(pos);
        state.anchor = pos;
        state.head = pos;
    }
}

//! Terminal rendering of the widget.

use std::io::Write;

use super::message::{ChatMessage, Sender};
use super::view::{ChatView, ElementIds, PanelState};

/// [`ChatView`] that prints messages to a writer.
///
/// The terminal has no real elements; every configured id is reported as
/// present. Input arrives through [`ChatView::set_input_value`].
///
/// Starts hidden. Messages appended while hidden are held back and printed
/// when the panel is shown.
#[derive(Debug)]
pub struct TerminalView<W> {
    ids: ElementIds,
    out: W,
    panel: PanelState,
    input: String,
    pending: Vec<String>,
}

impl<W: Write> TerminalView<W> {
    /// Create a view writing to `out`.
    pub fn new(ids: ElementIds, out: W) -> Self {
        Self {
            ids,
            out,
            panel: PanelState::Hidden,
            input: String::new(),
            pending: Vec::new(),
        }
    }

    /// The underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn has_element(&self, id: &str) -> bool {
        self.ids.all().contains(&id)
    }

    fn panel_state(&self) -> PanelState {
        self.panel
    }

    fn set_panel_state(&mut self, state: PanelState) {
        self.panel = state;
        let label = match state {
            PanelState::Shown => "[chat shown]",
            PanelState::Hidden => "[chat hidden]",
        };
        self.write_line(label);
        if state == PanelState::Shown {
            for line in std::mem::take(&mut self.pending) {
                self.write_line(&line);
            }
        }
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append_message(&mut self, message: &ChatMessage) {
        let prefix = match message.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };
        let line = format!("{prefix}> {}", message.content);
        match self.panel {
            PanelState::Shown => self.write_line(&line),
            PanelState::Hidden => self.pending.push(line),
        }
    }

    // Output is line-oriented; the newest line is always at the bottom.
    fn scroll_to_bottom(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_messages_and_panel() {
        let mut view = TerminalView::new(ElementIds::default(), Vec::new());
        view.set_panel_state(PanelState::Shown);
        view.append_message(&ChatMessage::user("hello"));
        view.append_message(&ChatMessage::bot("hi there"));
        view.set_panel_state(PanelState::Hidden);

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, "[chat shown]\nyou> hello\nbot> hi there\n[chat hidden]\n");
    }

    #[test]
    fn test_hidden_panel_holds_messages_until_shown() {
        let mut view = TerminalView::new(ElementIds::default(), Vec::new());
        assert_eq!(view.panel_state(), PanelState::Hidden);

        view.append_message(&ChatMessage::user("hello"));
        view.append_message(&ChatMessage::bot("hi there"));
        assert!(view.out.is_empty());

        view.set_panel_state(PanelState::Shown);
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, "[chat shown]\nyou> hello\nbot> hi there\n");
    }

    #[test]
    fn test_reports_configured_elements() {
        let view = TerminalView::new(ElementIds::default(), Vec::new());
        assert!(view.has_element("chatbot-messages"));
        assert!(!view.has_element("something-else"));
    }
}

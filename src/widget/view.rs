//! The element surface the controller drives.
//!
//! [`ChatView`] abstracts the five page elements the widget binds to. The
//! controller never reaches past this trait, so the same controller runs
//! against [`HeadlessView`] in tests and against
//! [`TerminalView`](super::terminal::TerminalView) from the CLI.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::message::ChatMessage;

/// Height in pixels of one rendered message line in [`HeadlessView`].
const LINE_HEIGHT: usize = 20;

/// Ids of the page elements the widget binds to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    /// Button that shows/hides the panel.
    pub toggle: String,
    /// Collapsible panel container.
    pub panel: String,
    /// Text input.
    pub input: String,
    /// Send button.
    pub send: String,
    /// Message list container.
    pub messages: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            toggle: "chatbot-toggle".to_string(),
            panel: "chatbot-box".to_string(),
            input: "chatbot-text".to_string(),
            send: "chatbot-send".to_string(),
            messages: "chatbot-messages".to_string(),
        }
    }
}

impl ElementIds {
    /// All ids, in binding order.
    #[must_use]
    pub fn all(&self) -> [&str; 5] {
        [
            &self.toggle,
            &self.panel,
            &self.input,
            &self.send,
            &self.messages,
        ]
    }
}

/// Visibility of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    /// `display: none`.
    #[default]
    Hidden,
    /// Vertically stacked flex layout.
    Shown,
}

impl PanelState {
    /// The opposite state.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Hidden => Self::Shown,
            Self::Shown => Self::Hidden,
        }
    }

    /// Inline style the panel carries in this state.
    #[must_use]
    pub fn style(self) -> &'static str {
        match self {
            Self::Hidden => "display: none",
            Self::Shown => "display: flex; flex-direction: column",
        }
    }
}

/// Element surface consumed by the chat controller.
pub trait ChatView {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Current panel visibility as computed from the panel's style.
    fn panel_state(&self) -> PanelState;

    /// Apply a panel visibility.
    fn set_panel_state(&mut self, state: PanelState);

    /// Current raw value of the text input.
    fn input_value(&self) -> String;

    /// Replace the input value.
    fn set_input_value(&mut self, value: &str);

    /// Empty the text input.
    fn clear_input(&mut self);

    /// Append a message node to the list.
    fn append_message(&mut self, message: &ChatMessage);

    /// Scroll the message list so its bottom edge is visible.
    fn scroll_to_bottom(&mut self);
}

/// In-memory view with the same observable state as the page widget.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    elements: BTreeSet<String>,
    panel: PanelState,
    input: String,
    messages: Vec<ChatMessage>,
    scroll_top: usize,
    scroll_height: usize,
}

impl HeadlessView {
    /// A view carrying every element in `ids`, panel hidden.
    #[must_use]
    pub fn new(ids: &ElementIds) -> Self {
        Self {
            elements: ids.all().iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Drop an element, simulating incomplete page markup.
    #[must_use]
    pub fn without_element(mut self, id: &str) -> Self {
        self.elements.remove(id);
        self
    }

    /// Start with the given panel state.
    #[must_use]
    pub fn with_panel(mut self, state: PanelState) -> Self {
        self.panel = state;
        self
    }

    /// Replace the input value, as typing would.
    pub fn type_text(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Current input value.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Messages in display order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Current panel visibility.
    #[must_use]
    pub fn panel(&self) -> PanelState {
        self.panel
    }

    /// Current scroll offset of the message list.
    #[must_use]
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Total scrollable height of the message list.
    #[must_use]
    pub fn scroll_height(&self) -> usize {
        self.scroll_height
    }

    /// Whether the newest message is in view.
    #[must_use]
    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.scroll_height
    }
}

impl ChatView for HeadlessView {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    fn panel_state(&self) -> PanelState {
        self.panel
    }

    fn set_panel_state(&mut self, state: PanelState) {
        self.panel = state;
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.type_text(value);
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append_message(&mut self, message: &ChatMessage) {
        self.scroll_height += message.content.lines().count().max(1) * LINE_HEIGHT;
        self.messages.push(message.clone());
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ids_match_page_markup() {
        let ids = ElementIds::default();
        assert_eq!(
            ids.all(),
            [
                "chatbot-toggle",
                "chatbot-box",
                "chatbot-text",
                "chatbot-send",
                "chatbot-messages"
            ]
        );
    }

    #[test]
    fn test_panel_style() {
        assert_eq!(PanelState::Hidden.style(), "display: none");
        assert_eq!(
            PanelState::Shown.style(),
            "display: flex; flex-direction: column"
        );
        assert_eq!(PanelState::Hidden.flipped().flipped(), PanelState::Hidden);
    }

    #[test]
    fn test_append_grows_height_without_scrolling() {
        let mut view = HeadlessView::new(&ElementIds::default());
        view.append_message(&ChatMessage::user("one\ntwo"));
        assert_eq!(view.scroll_height(), 2 * LINE_HEIGHT);
        assert!(!view.is_scrolled_to_bottom());

        view.scroll_to_bottom();
        assert!(view.is_scrolled_to_bottom());
    }

    #[test]
    fn test_without_element() {
        let ids = ElementIds::default();
        let view = HeadlessView::new(&ids).without_element(&ids.send);
        assert!(!view.has_element("chatbot-send"));
        assert!(view.has_element("chatbot-text"));
    }
}

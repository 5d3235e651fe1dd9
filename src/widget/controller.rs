//! Chat widget controller.
//!
//! Wires UI events to panel visibility and to a single request/response
//! exchange per submitted message. All view mutation happens on the task
//! that owns the [`ChatWidget`]; each network call runs as its own task and
//! posts its outcome back through a channel, so the UI side never waits on
//! the network.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::message::ChatMessage;
use super::transport::ChatTransport;
use super::view::{ChatView, ElementIds, PanelState};
use crate::error::{DeliveryError, WidgetError};

/// Bot text shown when a reply cannot be obtained.
pub const DEFAULT_FALLBACK: &str = "Hubo un error al contactar al asistente.";

/// Discrete UI events the widget reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// Click on the toggle control.
    Toggle,
    /// Click on the send control.
    Send,
    /// Key press while the input has focus.
    KeyPress(String),
    /// The input's value changed (typing, paste).
    Input(String),
}

/// Binding options.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Element ids to bind to.
    pub ids: ElementIds,
    /// Bot text used on delivery failure.
    pub fallback: String,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            ids: ElementIds::default(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

type Delivery = Result<String, DeliveryError>;

/// Controller bound to a [`ChatView`].
pub struct ChatWidget<V> {
    view: V,
    transport: Arc<dyn ChatTransport>,
    fallback: String,
    replies_tx: mpsc::UnboundedSender<Delivery>,
    replies_rx: mpsc::UnboundedReceiver<Delivery>,
    in_flight: usize,
}

impl<V: std::fmt::Debug> std::fmt::Debug for ChatWidget<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("view", &self.view)
            .field("fallback", &self.fallback)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl<V: ChatView> ChatWidget<V> {
    /// Bind the controller to `view`.
    ///
    /// Fails with [`WidgetError::MissingElement`] naming the first required
    /// element the view lacks.
    pub fn bind(
        view: V,
        transport: Arc<dyn ChatTransport>,
        options: WidgetOptions,
    ) -> Result<Self, WidgetError> {
        if let Some(missing) = options.ids.all().into_iter().find(|id| !view.has_element(id)) {
            return Err(WidgetError::MissingElement(missing.to_string()));
        }

        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Ok(Self {
            view,
            transport,
            fallback: options.fallback,
            replies_tx,
            replies_rx,
            in_flight: 0,
        })
    }

    /// Flip the panel between hidden and shown.
    pub fn toggle_panel(&mut self) {
        let next = self.view.panel_state().flipped();
        self.view.set_panel_state(next);
    }

    /// Current panel visibility.
    pub fn panel_state(&self) -> PanelState {
        self.view.panel_state()
    }

    /// Send the current input, if it is non-blank.
    ///
    /// Appends the user message and clears the input before returning; the
    /// reply is appended later, when [`next_reply`](Self::next_reply) or
    /// [`run`](Self::run) observes it. Returns whether a request was issued.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit_message(&mut self) -> bool {
        let text = self.view.input_value().trim().to_string();
        if text.is_empty() {
            return false;
        }

        self.append(&ChatMessage::user(text.clone()));
        self.view.clear_input();

        debug!(name: "widget.message.sent", chars = text.chars().count(), "Message submitted");

        let transport = Arc::clone(&self.transport);
        let replies = self.replies_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // A panicking transport still yields exactly one delivery.
            let call = tokio::spawn(async move { transport.send(&text).await });
            let result = call.await.unwrap_or_else(|e| Err(e.into()));
            let _ = replies.send(result);
        });
        true
    }

    /// React to a key press in the input. Only Enter submits.
    pub fn handle_key(&mut self, key: &str) {
        if key == "Enter" {
            self.submit_message();
        }
    }

    /// Dispatch a UI event.
    pub fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Toggle => self.toggle_panel(),
            WidgetEvent::Send => {
                self.submit_message();
            }
            WidgetEvent::KeyPress(key) => self.handle_key(&key),
            WidgetEvent::Input(value) => self.view.set_input_value(&value),
        }
    }

    /// Wait for the next outstanding reply and append it.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_reply(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.replies_rx.recv().await {
            Some(delivery) => {
                self.apply_delivery(delivery);
                true
            }
            None => false,
        }
    }

    /// Run the event loop until `events` closes and every outstanding reply
    /// has been appended, then hand the view back.
    pub async fn run(mut self, mut events: mpsc::Receiver<WidgetEvent>) -> V {
        let mut ui_open = true;
        loop {
            if !ui_open && self.in_flight == 0 {
                break;
            }
            tokio::select! {
                event = events.recv(), if ui_open => match event {
                    Some(event) => self.handle_event(event),
                    None => ui_open = false,
                },
                Some(delivery) = self.replies_rx.recv(), if self.in_flight > 0 => {
                    self.apply_delivery(delivery);
                }
            }
        }
        self.view
    }

    /// Requests issued whose reply has not been appended yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// The bound view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the bound view.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Release the view.
    pub fn into_view(self) -> V {
        self.view
    }

    fn apply_delivery(&mut self, delivery: Delivery) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let reply = match delivery {
            Ok(reply) => reply,
            Err(e) => {
                warn!(name: "widget.delivery.failed", error = %e, "Could not reach the assistant");
                self.fallback.clone()
            }
        };
        self.append(&ChatMessage::bot(reply));
    }

    fn append(&mut self, message: &ChatMessage) {
        self.view.append_message(message);
        self.view.scroll_to_bottom();
    }
}

//! Chat widget: a toggleable panel exchanging messages with the chatbot
//! endpoint.
//!
//! # Structure
//!
//! - [`controller`]: event wiring, panel toggle, message submission
//! - [`message`]: the chat message model
//! - [`view`]: the element surface ([`ChatView`]) and an in-memory view
//! - [`transport`]: the request/response exchange ([`ChatTransport`])
//! - [`terminal`]: a stdout rendering used by the `chat` subcommand

pub mod controller;
pub mod message;
pub mod terminal;
pub mod transport;
pub mod view;

pub use controller::{ChatWidget, DEFAULT_FALLBACK, WidgetEvent, WidgetOptions};
pub use message::{ChatMessage, Sender};
pub use terminal::TerminalView;
pub use transport::{ChatTransport, ChatbotReply, ChatbotRequest, HttpTransport};
pub use view::{ChatView, ElementIds, HeadlessView, PanelState};

//! Chatbot Widget
//!
//! A toggleable chat panel that sends each message to a chatbot endpoint
//! and shows the reply, together with the server that answers it.
//!
//! # Architecture
//!
//! - **Widget**: event-driven controller over an abstract element surface
//! - **Transport**: JSON `POST /api/chatbot` round trip
//! - **Server**: Axum router serving the widget page and the endpoint
//! - **Assistant**: OpenAI-compatible Chat Completions backend
//!
//! # Modules
//!
//! - [`widget`]: controller, message model, views and transport
//! - [`assistant`]: assistant trait and Chat Completions client
//! - [`server`]: HTTP router and handlers
//! - [`config`]: CLI and layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod assistant;
pub mod config;
pub mod error;
pub mod server;
pub mod widget;

use crate::assistant::Assistant;
use crate::config::AppConfig;

use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend producing replies.
    pub assistant: Arc<dyn Assistant>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish()
    }
}

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::{error, info};

use crate::AppState;
use crate::assistant::{Assistant, AssistantError};
use crate::config::AppConfig;
use crate::widget::{ChatbotReply, ChatbotRequest, ElementIds, PanelState};

/// Error body returned when the request carries no message.
const NO_MESSAGE: &str = "Mensaje no recibido";

/// Start the Axum server with the provided configuration.
pub async fn start_server(
    config: Arc<AppConfig>,
    assistant: Arc<dyn Assistant>,
) -> anyhow::Result<()> {
    let state = AppState {
        assistant,
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/api/chatbot", post(api_chatbot))
        .nest_service("/static", ServeDir::new(&config.server.static_dir))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Page hosting the widget.
async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let widget = &state.config.widget;
    Html(html_shell(
        &widget.title,
        &widget_markup(&widget.ids, &widget.fallback),
    ))
}

fn html_shell(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
    <script defer src="/static/chatbot.js"></script>
</head>
<body>
{content}
</body>
</html>"#
    )
}

/// Widget markup carrying the configured element ids. The panel starts
/// hidden. `static/chatbot.js` reads the ids and `fallback` back from the
/// root's `data-*` attributes.
pub fn widget_markup(ids: &ElementIds, fallback: &str) -> String {
    let [toggle, panel, input, send, messages] = ids.all().map(escape_html);
    let fallback = escape_html(fallback);
    let hidden = PanelState::Hidden.style();
    format!(
        r#"<div class="chatbot" data-toggle-id="{toggle}" data-panel-id="{panel}" data-input-id="{input}" data-send-id="{send}" data-messages-id="{messages}" data-fallback="{fallback}">
    <button id="{toggle}" type="button" aria-controls="{panel}">💬</button>
    <div id="{panel}" class="chatbot-box" style="{hidden}">
        <div id="{messages}" class="chatbot-messages" aria-live="polite"></div>
        <div class="chatbot-input">
            <input id="{input}" type="text" placeholder="Escribe tu mensaje..." autocomplete="off">
            <button id="{send}" type="button">Enviar</button>
        </div>
    </div>
</div>"#
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/chatbot - One message in, one reply out.
async fn api_chatbot(
    State(state): State<AppState>,
    body: Result<Json<ChatbotRequest>, JsonRejection>,
) -> Response {
    let message = match body {
        Ok(Json(req)) if !req.message.trim().is_empty() => req.message,
        _ => return error_response(StatusCode::BAD_REQUEST, NO_MESSAGE),
    };

    info!(
        name: "chatbot.request",
        chars = message.chars().count(),
        "Received chatbot message"
    );

    match state.assistant.reply(&message).await {
        Ok(response) => Json(ChatbotReply { response }).into_response(),
        Err(e) => {
            error!(name: "chatbot.failed", error = %e, "Assistant call failed");
            error_response(status_for(&e), &e.to_string())
        }
    }
}

fn status_for(e: &AssistantError) -> StatusCode {
    match e {
        AssistantError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AssistantError::NotConfigured
        | AssistantError::Connection(_)
        | AssistantError::Status { .. }
        | AssistantError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

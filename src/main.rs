//! Chatbot widget server and terminal client.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chatbot_widget::assistant::ChatCompletionsClient;
use chatbot_widget::config::{AppConfig, Cli, Command};
use chatbot_widget::server;
use chatbot_widget::widget::{
    ChatWidget, HttpTransport, TerminalView, WidgetEvent, WidgetOptions,
};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_cli(&cli).context("Configuration error")?);

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Chat { url } => chat(&config, &url).await,
    }
}

async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = config.assistant_settings();
    info!(
        name: "assistant.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        has_api_key = settings.api_key.is_some(),
        "Assistant configuration loaded"
    );

    let assistant = Arc::new(ChatCompletionsClient::new(settings));
    server::start_server(config, assistant).await
}

/// Drive the widget from stdin: each line is typed and sent with Enter,
/// `/toggle` flips the panel, which opens on start.
async fn chat(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let transport = Arc::new(HttpTransport::new(url).context("Invalid server URL")?);
    let options = WidgetOptions {
        ids: config.widget.ids.clone(),
        fallback: config.widget.fallback.clone(),
    };
    let view = TerminalView::new(options.ids.clone(), std::io::stdout());
    let mut widget = ChatWidget::bind(view, transport, options)?;
    widget.toggle_panel();

    info!(name: "chat.connected", endpoint = %url, "Type a message and press Enter");

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let events = if line.trim() == "/toggle" {
                vec![WidgetEvent::Toggle]
            } else {
                vec![
                    WidgetEvent::Input(line),
                    WidgetEvent::KeyPress("Enter".to_string()),
                ]
            };
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    });

    widget.run(rx).await;
    Ok(())
}

//! Layered configuration: defaults < config file < `CHATBOT_` env < CLI.

use std::path::Path;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::assistant::{
    AssistantSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE, Provider, provider::DEFAULT_AZURE_API_VERSION,
};
use crate::widget::{DEFAULT_FALLBACK, ElementIds};

/// Config file picked up from the working directory when none is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "CHATBOT_HOST")]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the widget page and the chatbot endpoint (default).
    Serve,
    /// Chat with a running server from the terminal.
    Chat {
        /// Server root URL.
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Directory served under `/static`.
    pub static_dir: String,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    /// Page title.
    pub title: String,
    /// Bot text shown when the assistant cannot be reached.
    pub fallback: String,
    #[serde(default)]
    pub ids: ElementIds,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("server.body_limit_bytes", 64 * 1024)?
            .set_default("widget.title", "Asistente")?
            .set_default("widget.fallback", DEFAULT_FALLBACK)?
            .set_default("assistant.model", DEFAULT_MODEL)?
            .set_default("assistant.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("assistant.max_tokens", i64::from(DEFAULT_MAX_TOKENS))?
            .set_default("assistant.temperature", f64::from(DEFAULT_TEMPERATURE))?;

        // An explicit file must exist; the cwd fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(CWD_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(CWD_CONFIG_FILE).required(false));
        }

        // E.g. CHATBOT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("CHATBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Assistant settings from the process environment.
    pub fn assistant_settings(&self) -> AssistantSettings {
        self.assistant_settings_from(|key| std::env::var(key).ok())
    }

    /// Assistant settings using `lookup` for the `LLM_*` variables.
    ///
    /// `LLM_API_KEY` wins over `OPENAI_API_KEY`; blank values count as unset.
    pub fn assistant_settings_from<F>(&self, lookup: F) -> AssistantSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = var("LLM_API_KEY").or_else(|| var("OPENAI_API_KEY"));

        let mut provider = Provider::detect_from_url(&base_url);
        if let Provider::AzureOpenAI { .. } = provider {
            provider = Provider::AzureOpenAI {
                deployment_name: var("AZURE_DEPLOYMENT_NAME").unwrap_or_default(),
                api_version: var("AZURE_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            };
        }

        AssistantSettings {
            base_url,
            api_key,
            model: var("LLM_MODEL").unwrap_or_else(|| self.assistant.model.clone()),
            provider,
            system_prompt: self.assistant.system_prompt.clone(),
            max_tokens: self.assistant.max_tokens,
            temperature: self.assistant.temperature,
        }
    }
}

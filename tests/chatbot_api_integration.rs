//! `/api/chatbot` backed by the Chat Completions client and a local
//! stand-in for the upstream API.

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_test::TestServer;
use chatbot_widget::AppState;
use chatbot_widget::assistant::{AssistantSettings, ChatCompletionsClient};
use chatbot_widget::config::AppConfig;
use chatbot_widget::server::build_router;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Upstream {
    last_body: Arc<Mutex<Option<Value>>>,
}

async fn completions(
    State(upstream): State<Upstream>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
    *upstream.last_body.lock().unwrap() = Some(body);

    match user.as_str() {
        "slow down" => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "rate limited" } })),
        ),
        "boom" => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": { "message": "bad gateway" } })),
        ),
        "empty" => (StatusCode::OK, Json(json!({ "choices": [] }))),
        _ => (
            StatusCode::OK,
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": format!("Respuesta a: {user}") } }]
            })),
        ),
    }
}

async fn spawn_upstream() -> (String, Upstream) {
    let upstream = Upstream::default();
    let router = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), upstream)
}

fn app(settings: AssistantSettings) -> TestServer {
    let config = Arc::new(AppConfig::load_from_args(["chatbot-widget"]).unwrap());
    let router = build_router(AppState {
        assistant: Arc::new(ChatCompletionsClient::new(settings)),
        config,
    });
    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn test_reply_from_upstream() {
    let (base, upstream) = spawn_upstream().await;
    let server = app(AssistantSettings::new(base, None));

    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "hola" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "response": "Respuesta a: hola" })
    );

    let sent = upstream.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(sent["model"], "gpt-4o-mini");
    assert_eq!(sent["max_tokens"], 150);
    assert_eq!(sent["messages"][0]["content"], "Eres un asistente útil y amable.");
}

#[tokio::test]
async fn test_rate_limit_maps_to_429() {
    let (base, _) = spawn_upstream().await;
    let server = app(AssistantSettings::new(base, None));

    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "slow down" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Límite de tasa de OpenAI excedido: "), "{error}");
}

#[tokio::test]
async fn test_upstream_status_maps_to_500() {
    let (base, _) = spawn_upstream().await;
    let server = app(AssistantSettings::new(base, None));

    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "boom" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Error de la API de OpenAI: 502 - "), "{error}");
}

#[tokio::test]
async fn test_empty_completion_is_unexpected_error() {
    let (base, _) = spawn_upstream().await;
    let server = app(AssistantSettings::new(base, None));

    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "empty" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Un error inesperado ocurrió: "), "{error}");
}

#[tokio::test]
async fn test_missing_api_key_for_hosted_provider() {
    let server = app(AssistantSettings::new("https://api.openai.com", None));

    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "hola" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "OpenAI API key no configurada." })
    );
}

#[tokio::test]
async fn test_unreachable_upstream_maps_to_500() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = app(AssistantSettings::new(format!("http://{addr}"), None));
    let response = server
        .post("/api/chatbot")
        .json(&json!({ "message": "hola" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("No se pudo conectar a la API de OpenAI: "), "{error}");
}

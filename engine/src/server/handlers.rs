use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info_span, warn, Instrument};

use sdk::{AgentEvent, SageError};

use super::{ApiError, AppState};
use crate::chat::settings::TEMPERATURE_STEP;
use crate::chat::{ExchangeState, ModelChoice, Settings};
use crate::session::SessionStore;

/// Body of `POST /api/sessions/:id/messages`
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub model: Option<String>,
}

impl AppState {
    /// Settings for one exchange; omitted fields take the configured defaults
    fn settings_for(&self, request: &MessageRequest) -> Result<Settings, SageError> {
        let model = match request.model.as_deref() {
            Some(model) => model.parse::<ModelChoice>()?,
            None => self.config.default_model()?,
        };
        let temperature = request
            .temperature
            .unwrap_or(self.config.llm.default_temperature);

        Settings::new(
            request.api_key.clone().map(Into::into),
            temperature,
            model,
        )
    }
}

fn session_view(id: &str, store: &SessionStore) -> Value {
    json!({
        "session_id": id,
        "transcript": store.transcript(),
        "state": store.state(),
    })
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "search_backend": state.search_backend,
    }))
}

pub async fn models(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let default_model = state.config.default_model()?;
    let models: Vec<Value> = ModelChoice::ALL
        .iter()
        .map(|m| json!({ "id": m.id(), "name": m.display_name() }))
        .collect();

    Ok(Json(json!({
        "models": models,
        "default_model": default_model.id(),
        "default_temperature": state.config.llm.default_temperature,
        "temperature_step": TEMPERATURE_STEP,
    })))
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (id, handle) = state.sessions.create().await;
    let store = handle.lock().await;
    (StatusCode::CREATED, Json(session_view(&id, &store)))
}

/// Current transcript and state. While an exchange is running the store is
/// held by it, so the last published transcript is served instead.
pub async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let handle = state.sessions.get_or_create(&id).await;
    let view = match handle.try_begin() {
        Ok(store) => session_view(&id, &store),
        Err(_) => json!({
            "session_id": id,
            "transcript": handle.published_transcript(),
            "state": ExchangeState::AgentRunning,
        }),
    };
    Json(view)
}

/// Run one exchange.
///
/// The exchange runs on its own task with an owned guard on the store, so
/// a client that disconnects mid-run does not cancel it: the assistant turn
/// is still recorded and the session is released when the agent finishes.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let handle = state.sessions.get_or_create(&id).await;
    let settings = state.settings_for(&request)?;
    let mut store = handle.try_begin()?;

    let chat = Arc::clone(&state.chat);
    let exchange_handle = Arc::clone(&handle);
    let exchange = async move {
        let sink = exchange_handle.sink();
        let outcome = chat
            .submit(&mut store, &request.text, &settings, &sink)
            .await;
        exchange_handle.publish(&store);
        outcome.map(|outcome| {
            json!({
                "outcome": outcome,
                "transcript": store.transcript(),
                "state": store.state(),
            })
        })
    }
    .instrument(info_span!("exchange", session_id = %id));

    let body = tokio::spawn(exchange)
        .await
        .map_err(|e| SageError::AgentExecution(format!("Exchange task failed: {}", e)))??;

    Ok(Json(body))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let handle = state.sessions.get_or_create(&id).await;
    let mut store = handle.try_begin()?;
    state.chat.reset(&mut store);
    handle.publish(&store);
    Ok(Json(session_view(&id, &store)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(SageError::SessionNotFound(id).into())
    }
}

pub async fn session_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(handle) = state.sessions.get(&id).await else {
        return ApiError(SageError::SessionNotFound(id)).into_response();
    };

    let events = handle.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, events))
}

/// Push agent progress to the socket until either side closes
async fn forward_events(mut socket: WebSocket, mut events: broadcast::Receiver<AgentEvent>) {
    debug!("Progress socket opened");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("Progress socket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let Ok(text) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Progress socket lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    debug!("Progress socket closed");
}

//! HTTP server inbound adapter that serves the name form and the generate API.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context as AnyhowContext, Result};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::core::{
    domain::EMPTY_SUBJECT_MESSAGE,
    error::Error as CoreError,
    ports::{GenerateNamesRequest, NameService},
};

pub const CONFIG_MISSING_MESSAGE: &str =
    "OpenAI API key not configured, please follow instructions in README.md";
pub const EXHAUSTED_MESSAGE: &str = "Could not obtain enough unique names, please try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during your request.";

const INDEX_HTML: &str = include_str!("index.html");

/// Configuration options for the server adapter.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            body_limit: 16 * 1024,
        }
    }
}

/// Server adapter that exposes the `NameService` via HTTP.
pub struct ServerAdapter {
    service: Arc<dyn NameService>,
    options: ServeOptions,
}

impl ServerAdapter {
    pub fn new(service: Arc<dyn NameService>, options: ServeOptions) -> Self {
        Self { service, options }
    }

    /// Run the HTTP server on the given address.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .context("failed to bind petnamer listener")?;
        self.run_with_listener(listener).await
    }

    /// Run the HTTP server with an existing listener (useful for tests).
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<()> {
        let router = self.into_router();
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "petnamer serve listening");
        } else {
            info!("petnamer serve listening");
        }
        axum::serve(listener, router.into_make_service())
            .await
            .context("serve endpoint failed")
    }

    pub fn into_router(self) -> Router {
        let state = Arc::new(ServeState {
            service: self.service,
        });
        build_router(state, &self.options)
    }
}

struct ServeState {
    service: Arc<dyn NameService>,
}

fn build_router(state: Arc<ServeState>, options: &ServeOptions) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .layer(DefaultBodyLimit::max(options.body_limit.max(1)))
        .with_state(state)
}

#[derive(Deserialize)]
struct GenerateBody {
    #[serde(default)]
    animal: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    result: Vec<String>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorMessage,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler(State(state): State<Arc<ServeState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "configured": state.service.is_configured(),
    }))
}

async fn generate_handler(
    State(state): State<Arc<ServeState>>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    async move {
        let body = match payload {
            Ok(Json(body)) => body,
            Err(rejection) => {
                warn!(reason = %rejection.body_text(), "rejected malformed generate request");
                return error_message(StatusCode::BAD_REQUEST, EMPTY_SUBJECT_MESSAGE);
            }
        };

        let request = GenerateNamesRequest {
            animal: body.animal,
            count: None,
        };
        match state.service.generate_names(request).await {
            Ok(generated) => (
                StatusCode::OK,
                Json(GenerateResponse {
                    result: generated.names,
                }),
            )
                .into_response(),
            Err(err) => error_response(err),
        }
    }
    .instrument(info_span!("generate", %request_id))
    .await
}

/// Maps a service failure onto the wire. Only validation messages and relayed
/// upstream bodies reach the caller; other details stay in the logs.
fn error_response(err: CoreError) -> Response {
    match err {
        CoreError::InvalidInput(message) => error_message(StatusCode::BAD_REQUEST, &message),
        CoreError::ConfigMissing => {
            error_message(StatusCode::INTERNAL_SERVER_ERROR, CONFIG_MISSING_MESSAGE)
        }
        CoreError::Upstream { status, body, .. } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                "application/json"
            } else {
                "text/plain; charset=utf-8"
            };
            (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        CoreError::Exhausted { .. } => {
            error_message(StatusCode::INTERNAL_SERVER_ERROR, EXHAUSTED_MESSAGE)
        }
        CoreError::System(_) => {
            error_message(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_MESSAGE)
        }
    }
}

fn error_message(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            error: ErrorMessage {
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

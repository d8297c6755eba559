use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use memochat_agent::{ChatError, GenerationParams};
use memochat_core::session::{SessionManager, SharedSession, Turn};
use memochat_providers::ModelSpec;

use crate::page::{self, Notice, PageView};
use crate::state::{
    AppState, AskForm, ChatRequest, ChatResponse, ErrorResponse, PageQuery, TranscriptResponse,
};

fn status_for(error: &ChatError) -> StatusCode {
    if error.is_generation_failure() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Resolve a caller-supplied session id, creating the session when it is
/// missing, blank or unknown
fn resolve_session(state: &AppState, id: Option<&str>) -> (String, SharedSession) {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => (id.to_string(), state.sessions.get_or_create(id)),
        None => state.sessions.create(),
    }
}

fn render_page(
    state: &AppState,
    session: &str,
    params: &GenerationParams,
    transcript: &[Turn],
    notice: Option<Notice>,
) -> Html<String> {
    Html(page::render(&PageView {
        session,
        models: state.generator.registry().models(),
        params,
        transcript,
        notice,
    }))
}

pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(id) = query
        .session
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        // The session is only stored once a question is asked under it.
        let id = SessionManager::new_id();
        tracing::debug!(session = %id, "New page session");
        return Redirect::to(&format!("/?session={}", id)).into_response();
    };

    let transcript = transcript_of(&state, id).await;
    render_page(&state, id, &state.defaults, &transcript, None).into_response()
}

pub async fn ask_handler(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    let params = state.params(form.model, form.temperature, form.max_tokens);

    if let Err(e) = state.generator.check_request(&form.question, &params) {
        let id = match form.session.trim() {
            "" => SessionManager::new_id(),
            id => id.to_string(),
        };
        let transcript = transcript_of(&state, &id).await;
        let (status, notice) = page_notice(&id, e);
        return (
            status,
            render_page(&state, &id, &params, &transcript, Some(notice)),
        )
            .into_response();
    }

    let (id, session) = resolve_session(&state, Some(form.session.as_str()));
    let mut session = session.lock().await;
    let result = state
        .generator
        .generate(&mut session, &form.question, &params)
        .await;

    let (status, notice) = match result {
        Ok(reply) => (StatusCode::OK, Notice::Reply(reply)),
        Err(e) => page_notice(&id, e),
    };

    (
        status,
        render_page(&state, &id, &params, session.turns(), Some(notice)),
    )
        .into_response()
}

fn page_notice(session: &str, error: ChatError) -> (StatusCode, Notice) {
    match error {
        ChatError::EmptyInput => (StatusCode::OK, Notice::Warning(error.to_string())),
        e => {
            tracing::error!(session = %session, "Page request failed: {}", e);
            (status_for(&e), Notice::Error(e.to_string()))
        }
    }
}

/// Turns of an existing session, empty when the id is not stored yet
async fn transcript_of(state: &AppState, id: &str) -> Vec<Turn> {
    match state.sessions.get(id) {
        Some(session) => session.lock().await.snapshot(),
        None => Vec::new(),
    }
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let params = state.params(payload.model, payload.temperature, payload.max_tokens);
    if let Err(e) = state.generator.check_request(&payload.message, &params) {
        let body = ErrorResponse {
            error: e.to_string(),
            session: None,
        };
        return (status_for(&e), Json(body)).into_response();
    }

    let (id, session) = resolve_session(&state, payload.session.as_deref());
    let mut session = session.lock().await;
    match state
        .generator
        .generate(&mut session, &payload.message, &params)
        .await
    {
        Ok(reply) => Json(ChatResponse {
            session: id,
            reply,
            transcript: session.snapshot(),
        })
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status == StatusCode::BAD_GATEWAY {
                tracing::error!(session = %id, "Chat request failed: {}", e);
            }
            let body = ErrorResponse {
                error: e.to_string(),
                session: e.is_generation_failure().then_some(id),
            };
            (status, Json(body)).into_response()
        }
    }
}

pub async fn list_models_handler(State(state): State<AppState>) -> Json<Vec<ModelSpec>> {
    Json(state.generator.registry().models().to_vec())
}

pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.sessions.get(&id) {
        Some(session) => {
            let session = session.lock().await;
            Json(TranscriptResponse {
                session: id,
                transcript: session.snapshot(),
                created_at: session.created_at(),
                updated_at: session.updated_at(),
            })
            .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", id),
                session: None,
            }),
        )
            .into_response(),
    }
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.sessions.remove(&id) {
        tracing::info!(session = %id, "Session removed");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn health_handler() -> &'static str {
    "ok"
}

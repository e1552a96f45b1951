//! Axum route handlers for the Screening API.
//!
//! Each handler takes the session's lock, loads the session, applies at most one
//! transition, settles render-time work (question generation, report finalization),
//! saves, and renders. The lock is held until the response is built.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::ScreeningSession;
use crate::screening::form::FieldValue;
use crate::screening::machine::{self, AnswerOutcome};
use crate::screening::prompts::GREETING;
use crate::screening::recorder::finalize;
use crate::screening::view::{render, SessionView};
use crate::screening::ScreeningError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitFieldRequest {
    /// The step the client rendered. Optional; when present it must match the current step.
    pub step: Option<u8>,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub greeting: &'static str,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct FieldResponse {
    pub acknowledgement: String,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub outcome: AnswerOutcome,
    pub session: SessionView,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: Uuid) -> Result<ScreeningSession, AppError> {
    state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Generates questions on first arrival at step 8 and finalizes the report once complete.
/// Both are memoized in the session, so settling twice is a no-op.
async fn settle(session: &mut ScreeningSession, state: &AppState) -> Result<(), ScreeningError> {
    if session.halted.is_some() {
        return Ok(());
    }
    machine::ensure_questions(session, state.llm.as_ref()).await?;
    finalize(session, state.reports.as_ref()).await;
    Ok(())
}

/// Settles, then saves regardless of the outcome so a halt is persisted.
async fn settle_and_save(session: &mut ScreeningSession, state: &AppState) -> Result<(), AppError> {
    let settled = settle(session, state).await;
    state.sessions.save(session).await?;
    settled.map_err(AppError::from)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let session = ScreeningSession::new();
    state.sessions.save(&session).await?;
    tracing::info!("Created screening session {}", session.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            greeting: GREETING,
            session: render(&session),
        }),
    ))
}

/// GET /api/v1/sessions/:id
///
/// Renders the current step. Never advances the form; at step 8 it may generate
/// the questions (once) or finalize the report (once).
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    settle_and_save(&mut session, &state).await?;
    Ok(Json(render(&session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    if state.sessions.remove(id).await? {
        tracing::info!("Deleted screening session {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/reset
///
/// Restarts from step 1, including after a halted question generation.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    session.reset();
    state.sessions.save(&session).await?;
    tracing::info!("Reset screening session {id}");
    Ok(Json(render(&session)))
}

/// POST /api/v1/sessions/:id/fields
pub async fn handle_submit_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitFieldRequest>,
) -> Result<Json<FieldResponse>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    let acknowledgement = machine::submit_field(&mut session, request.step, &request.value)?;
    settle_and_save(&mut session, &state).await?;

    Ok(Json(FieldResponse {
        acknowledgement,
        session: render(&session),
    }))
}

/// POST /api/v1/sessions/:id/fields/skip
pub async fn handle_skip_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FieldResponse>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    let acknowledgement = machine::skip_phone(&mut session)?;
    settle_and_save(&mut session, &state).await?;

    Ok(Json(FieldResponse {
        acknowledgement,
        session: render(&session),
    }))
}

/// POST /api/v1/sessions/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    settle_and_save(&mut session, &state).await?;

    let outcome = machine::submit_answer(&mut session, &request.answer, state.llm.as_ref()).await?;
    settle_and_save(&mut session, &state).await?;

    Ok(Json(AnswerResponse {
        outcome,
        session: render(&session),
    }))
}

/// POST /api/v1/sessions/:id/override
///
/// "Continue Anyway" after a misaligned answer.
pub async fn handle_override(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.session_locks.acquire(id).await;
    let mut session = load_session(&state, id).await?;
    machine::override_answer(&mut session)?;
    settle_and_save(&mut session, &state).await?;
    Ok(Json(render(&session)))
}

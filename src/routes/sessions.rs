// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training session routes: planning, queries, and live execution.

use crate::error::{AppError, Result};
use crate::models::{NewSession, SessionPatch, SetEdit, TrainingSession};
use crate::services::CompletionOutcome;
use crate::time_utils::parse_iso_date;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(add_session))
        .route("/api/sessions/active", get(get_active_session))
        .route(
            "/api/sessions/{id}",
            get(get_session)
                .patch(update_session)
                .delete(delete_session),
        )
        .route("/api/sessions/{id}/progress", get(get_progress))
        .route("/api/sessions/{id}/start", post(start_session))
        .route("/api/sessions/{id}/complete", post(complete_session))
        .route(
            "/api/sessions/{id}/exercises/{exercise}/sets/{set}",
            patch(record_set),
        )
}

// ─── Queries ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionsQuery {
    /// Sessions on this day (YYYY-MM-DD)
    date: Option<String>,
    /// Sessions in the week containing this day (YYYY-MM-DD)
    week: Option<String>,
}

fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|raw| {
        parse_iso_date(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid '{}' parameter: must be YYYY-MM-DD", name))
        })
    })
    .transpose()
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionsQuery>,
) -> Result<Json<Vec<TrainingSession>>> {
    let date = parse_date_param("date", params.date.as_deref())?;
    let week = parse_date_param("week", params.week.as_deref())?;

    let sessions = match (date, week) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "Use either 'date' or 'week', not both".to_string(),
            ));
        }
        (Some(date), None) => state.sessions.query_by_date(date),
        (None, Some(week)) => state.sessions.query_week(week),
        (None, None) => state.sessions.list(),
    };
    Ok(Json(sessions))
}

async fn get_active_session(
    State(state): State<Arc<AppState>>,
) -> Json<Option<TrainingSession>> {
    Json(state.sessions.query_active())
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrainingSession>> {
    state
        .sessions
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
    let progress = session.progress();
    Ok(Json(ProgressResponse {
        completed: progress.completed,
        total: progress.total,
        percent: progress.percent(),
    }))
}

// ─── Planning ────────────────────────────────────────────────

async fn add_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewSession>,
) -> Result<(StatusCode, Json<TrainingSession>)> {
    body.check().map_err(AppError::BadRequest)?;
    let session = state.sessions.add(body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SessionPatch>,
) -> Result<Json<TrainingSession>> {
    body.check().map_err(AppError::BadRequest)?;

    state
        .sessions
        .update(&id, &body)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.sessions.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Execution ───────────────────────────────────────────────

async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TrainingSession>> {
    Ok(Json(state.lifecycle.start(&id).await?))
}

#[derive(Deserialize)]
struct CompleteRequest {
    #[serde(default)]
    notes: Option<String>,
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<CompletionOutcome>> {
    Ok(Json(state.lifecycle.complete(&id, body.notes).await?))
}

async fn record_set(
    State(state): State<Arc<AppState>>,
    Path((id, exercise, set)): Path<(String, usize, usize)>,
    Json(edit): Json<SetEdit>,
) -> Result<Json<TrainingSession>> {
    Ok(Json(
        state.lifecycle.record_set(&id, exercise, set, &edit).await?,
    ))
}

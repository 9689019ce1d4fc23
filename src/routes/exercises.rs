// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise backlog routes.

use crate::error::{AppError, Result};
use crate::models::{Equipment, Exercise, ExercisePatch, MuscleGroup, NewExercise};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::IntoEnumIterator;
use validator::Validate;

const MAX_SEARCH_LEN: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises).post(add_exercise))
        .route("/api/exercises/vocabulary", get(get_vocabulary))
        .route(
            "/api/exercises/{id}",
            patch(update_exercise).delete(delete_exercise),
        )
}

#[derive(Deserialize)]
struct ExercisesQuery {
    /// Search term for name or muscle group
    q: Option<String>,
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExercisesQuery>,
) -> Result<Json<Vec<Exercise>>> {
    let exercises = match params.q.as_deref() {
        Some(term) if term.len() > MAX_SEARCH_LEN => {
            return Err(AppError::BadRequest(format!(
                "Search term must be at most {} characters",
                MAX_SEARCH_LEN
            )));
        }
        Some(term) => state.exercises.search(term),
        None => state.exercises.list(),
    };
    Ok(Json(exercises))
}

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewExercise>,
) -> Result<(StatusCode, Json<Exercise>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let exercise = state.exercises.add(body.normalized()).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ExercisePatch>,
) -> Result<Json<Exercise>> {
    body.check().map_err(AppError::BadRequest)?;

    state
        .exercises
        .update(&id, &body)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found", id)))
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.exercises.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fixed tag vocabularies for building forms.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyResponse {
    pub muscle_groups: Vec<MuscleGroup>,
    pub equipment: Vec<Equipment>,
}

async fn get_vocabulary() -> Json<VocabularyResponse> {
    Json(VocabularyResponse {
        muscle_groups: MuscleGroup::iter().collect(),
        equipment: Equipment::iter().collect(),
    })
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod exercise;
pub mod session;

pub use exercise::{Equipment, Exercise, ExercisePatch, MuscleGroup, NewExercise};
pub use session::{
    NewSession, Progress, SessionError, SessionExercise, SessionPatch, SessionStatus, SetEdit,
    TrainingSession, TrainingSet,
};

use serde::{Deserialize, Deserializer};

/// Distinguish an absent patch field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank free text is stored as absent.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

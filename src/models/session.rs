// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training session model: scheduled exercises, their sets, and the
//! session status lifecycle.
//!
//! Edits never mutate a session in place; every helper returns a new value
//! that the caller persists as a whole.

use super::{double_option, non_blank};
use crate::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Target reps for a freshly planned set.
pub const DEFAULT_TARGET_REPS: u32 = 10;

/// Session status.
///
/// `planned -> in-progress -> completed`; nothing leaves `completed`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Planned, SessionStatus::InProgress)
                | (SessionStatus::InProgress, SessionStatus::Completed)
        )
    }
}

/// One planned/executed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSet {
    pub target_reps: u32,
    #[serde(default)]
    pub actual_reps: u32,
    /// Kilograms, fractional allowed
    #[serde(default)]
    pub weight: f64,
    /// Free-text equipment override
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl TrainingSet {
    pub fn planned(target_reps: u32) -> Self {
        Self {
            target_reps,
            actual_reps: 0,
            weight: 0.0,
            equipment: None,
            completed: false,
        }
    }
}

impl Default for TrainingSet {
    fn default() -> Self {
        Self::planned(DEFAULT_TARGET_REPS)
    }
}

/// An exercise scheduled within a session.
///
/// `exercise_id` is a lookup-only reference into the backlog; it may point
/// at an exercise that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
    pub exercise_id: String,
    /// Display order is significant ("set N" = index + 1)
    pub sets: Vec<TrainingSet>,
}

impl SessionExercise {
    /// Schedule an exercise with a single default set.
    pub fn planned(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            sets: vec![TrainingSet::default()],
        }
    }

    /// Keep the first `count` sets, padding with default sets.
    pub fn resize_sets(&self, count: usize) -> Self {
        let mut sets: Vec<TrainingSet> = self.sets.iter().take(count).cloned().collect();
        sets.resize_with(count, TrainingSet::default);
        Self {
            exercise_id: self.exercise_id.clone(),
            sets,
        }
    }

    pub fn with_target_reps(&self, set: usize, reps: u32) -> Result<Self, SessionError> {
        let mut updated = self.clone();
        let target = updated
            .sets
            .get_mut(set)
            .ok_or(SessionError::SetOutOfRange { exercise: 0, set })?;
        target.target_reps = reps;
        Ok(updated)
    }
}

/// Single field edit applied to one set during an active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SetEdit {
    Completed(bool),
    ActualReps(u32),
    Weight(f64),
    Equipment(Option<String>),
}

/// Completed vs. total set counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage complete; 0 for a session without sets.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// A dated training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: String,
    pub date: NaiveDate,
    pub exercises: Vec<SessionExercise>,
    pub status: SessionStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TrainingSession {
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    pub fn progress(&self) -> Progress {
        let completed = self
            .exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.completed)
            .count();
        Progress {
            completed,
            total: self.total_sets(),
        }
    }

    pub fn all_sets_completed(&self) -> bool {
        self.exercises
            .iter()
            .all(|e| e.sets.iter().all(|s| s.completed))
    }

    pub fn incomplete_sets(&self) -> usize {
        let progress = self.progress();
        progress.total - progress.completed
    }

    /// Return a copy with one set edited.
    pub fn with_set_edit(
        &self,
        exercise: usize,
        set: usize,
        edit: &SetEdit,
    ) -> Result<Self, SessionError> {
        let mut updated = self.clone();
        let target = updated
            .exercises
            .get_mut(exercise)
            .ok_or(SessionError::ExerciseOutOfRange(exercise))?
            .sets
            .get_mut(set)
            .ok_or(SessionError::SetOutOfRange { exercise, set })?;

        match edit {
            SetEdit::Completed(completed) => target.completed = *completed,
            SetEdit::ActualReps(reps) => target.actual_reps = *reps,
            SetEdit::Weight(weight) => {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(SessionError::InvalidWeight(*weight));
                }
                target.weight = *weight;
            }
            SetEdit::Equipment(equipment) => target.equipment = non_blank(equipment.clone()),
        }

        Ok(updated)
    }
}

/// Input for scheduling a session.
///
/// `status` is accepted for compatibility and ignored: new sessions are
/// always `planned`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub date: NaiveDate,
    pub exercises: Vec<SessionExercise>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
}

impl NewSession {
    pub fn new(date: NaiveDate, exercises: Vec<SessionExercise>) -> Self {
        Self {
            date,
            exercises,
            notes: None,
            status: None,
        }
    }

    /// Planning rules: at least one exercise, each scheduled once.
    pub fn check(&self) -> Result<(), String> {
        check_exercises(&self.exercises)
    }

    pub fn with_id(self, id: String) -> TrainingSession {
        TrainingSession {
            id,
            date: self.date,
            exercises: self.exercises,
            status: SessionStatus::Planned,
            notes: self.notes,
        }
    }
}

/// At least one exercise, each scheduled once, weights finite and >= 0.
fn check_exercises(exercises: &[SessionExercise]) -> Result<(), String> {
    if exercises.is_empty() {
        return Err("at least one exercise is required".to_string());
    }
    for (i, exercise) in exercises.iter().enumerate() {
        if exercises[..i]
            .iter()
            .any(|e| e.exercise_id == exercise.exercise_id)
        {
            return Err(format!(
                "exercise {} is scheduled more than once",
                exercise.exercise_id
            ));
        }
        if let Some(set) = exercise
            .sets
            .iter()
            .find(|s| !s.weight.is_finite() || s.weight < 0.0)
        {
            return Err(SessionError::InvalidWeight(set.weight).to_string());
        }
    }
    Ok(())
}

/// Partial update of a session. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<SessionExercise>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl SessionPatch {
    /// Reject exercise lists that would leave the session invalid.
    /// Status is not checked here.
    pub fn check(&self) -> Result<(), String> {
        match &self.exercises {
            Some(exercises) => check_exercises(exercises),
            None => Ok(()),
        }
    }

    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Replace every field with the values of `session` (whole-session save).
    pub fn replace_with(session: &TrainingSession) -> Self {
        Self {
            date: Some(session.date),
            exercises: Some(session.exercises.clone()),
            status: Some(session.status),
            notes: Some(session.notes.clone()),
        }
    }

    pub fn apply(&self, session: &TrainingSession) -> TrainingSession {
        let mut updated = session.clone();
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(exercises) = &self.exercises {
            updated.exercises = exercises.clone();
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(notes) = &self.notes {
            updated.notes = notes.clone();
        }
        updated
    }
}

/// Errors from session edits and lifecycle transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("No exercise at position {0}")]
    ExerciseOutOfRange(usize),

    #[error("No set {set} in exercise {exercise}")]
    SetOutOfRange { exercise: usize, set: usize },

    #[error("Weight must be a non-negative number, got {0}")]
    InvalidWeight(f64),

    #[error("Cannot move session from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Session {0} is already in progress")]
    AnotherSessionActive(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(completed: bool) -> TrainingSet {
        TrainingSet {
            completed,
            ..TrainingSet::default()
        }
    }

    fn session(exercises: Vec<Vec<bool>>) -> TrainingSession {
        TrainingSession {
            id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            exercises: exercises
                .into_iter()
                .enumerate()
                .map(|(i, sets)| SessionExercise {
                    exercise_id: format!("ex-{i}"),
                    sets: sets.into_iter().map(set).collect(),
                })
                .collect(),
            status: SessionStatus::InProgress,
            notes: None,
        }
    }

    #[test]
    fn test_progress_two_of_five() {
        let s = session(vec![vec![true, false, false], vec![true, false]]);
        let progress = s.progress();
        assert_eq!(progress, Progress { completed: 2, total: 5 });
        assert!((progress.percent() - 40.0).abs() < f64::EPSILON);
        assert_eq!(s.incomplete_sets(), 3);
        assert!(!s.all_sets_completed());
    }

    #[test]
    fn test_progress_without_sets_is_zero() {
        let s = session(vec![vec![], vec![]]);
        assert_eq!(s.progress().percent(), 0.0);
        assert!(s.all_sets_completed());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(SessionStatus::InProgress).unwrap(),
            json!("in-progress")
        );
        assert_eq!(SessionStatus::InProgress.to_string(), "in-progress");
    }

    #[test]
    fn test_transitions() {
        use SessionStatus::*;
        assert!(Planned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!Planned.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Planned));
    }

    #[test]
    fn test_set_edit_returns_new_value() {
        let original = session(vec![vec![false, false]]);
        let edited = original
            .with_set_edit(0, 1, &SetEdit::Weight(22.5))
            .unwrap();

        assert_eq!(edited.exercises[0].sets[1].weight, 22.5);
        assert_eq!(original.exercises[0].sets[1].weight, 0.0);

        let edited = edited
            .with_set_edit(0, 1, &SetEdit::Equipment(Some("  ".to_string())))
            .unwrap();
        assert_eq!(edited.exercises[0].sets[1].equipment, None);
    }

    #[test]
    fn test_set_edit_rejects_bad_input() {
        let s = session(vec![vec![false]]);
        assert_eq!(
            s.with_set_edit(1, 0, &SetEdit::Completed(true)),
            Err(SessionError::ExerciseOutOfRange(1))
        );
        assert_eq!(
            s.with_set_edit(0, 3, &SetEdit::Completed(true)),
            Err(SessionError::SetOutOfRange {
                exercise: 0,
                set: 3
            })
        );
        assert!(matches!(
            s.with_set_edit(0, 0, &SetEdit::Weight(-1.0)),
            Err(SessionError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_set_edit_wire_format() {
        let edit: SetEdit =
            serde_json::from_value(json!({"field": "actualReps", "value": 8})).unwrap();
        assert_eq!(edit, SetEdit::ActualReps(8));
    }

    #[test]
    fn test_resize_sets_keeps_existing() {
        let planned = SessionExercise::planned("ex")
            .with_target_reps(0, 5)
            .unwrap();
        let grown = planned.resize_sets(3);
        assert_eq!(grown.sets.len(), 3);
        assert_eq!(grown.sets[0].target_reps, 5);
        assert_eq!(grown.sets[2].target_reps, DEFAULT_TARGET_REPS);

        let shrunk = grown.resize_sets(1);
        assert_eq!(shrunk.sets, vec![planned.sets[0].clone()]);
    }

    #[test]
    fn test_new_session_check() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(NewSession::new(date, vec![]).check().is_err());
        assert!(NewSession::new(
            date,
            vec![SessionExercise::planned("a"), SessionExercise::planned("a")]
        )
        .check()
        .is_err());
        assert!(NewSession::new(date, vec![SessionExercise::planned("a")])
            .check()
            .is_ok());
    }

    #[test]
    fn test_new_session_forced_planned() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut input = NewSession::new(date, vec![SessionExercise::planned("a")]);
        input.status = Some(SessionStatus::Completed);
        assert_eq!(input.with_id("x".to_string()).status, SessionStatus::Planned);
    }
}

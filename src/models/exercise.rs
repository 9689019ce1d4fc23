// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise backlog model.

use super::{double_option, non_blank};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

/// Muscle group tags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Abs,
    FullBody,
}

/// Equipment tags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum Equipment {
    Bodyweight,
    Dumbbells,
    Barbell,
    ResistanceBand,
    Kettlebell,
    Machine,
}

/// A reusable exercise definition in the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Generated at creation, never changes
    pub id: String,
    pub name: String,
    pub muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Exercise {
    /// Case-insensitive match on the name or any muscle group.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .muscle_groups
                .iter()
                .any(|g| g.as_ref().to_lowercase().contains(&term))
    }
}

/// Input for creating an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "at least one muscle group is required"))]
    pub muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExercise {
    /// Attach an id. Stored fields are taken as given.
    pub fn with_id(self, id: String) -> Exercise {
        Exercise {
            id,
            name: self.name,
            muscle_groups: self.muscle_groups,
            equipment: self.equipment,
            notes: self.notes,
        }
    }

    /// Trim the name, drop duplicate tags and blank notes.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.muscle_groups = dedup_groups(self.muscle_groups);
        self.notes = non_blank(self.notes);
        self
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn dedup_groups(groups: Vec<MuscleGroup>) -> Vec<MuscleGroup> {
    let mut seen = Vec::with_capacity(groups.len());
    for group in groups {
        if !seen.contains(&group) {
            seen.push(group);
        }
    }
    seen
}

/// Partial update of an exercise. Absent fields are left untouched;
/// `null` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment: Option<Option<Equipment>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl ExercisePatch {
    /// Reject patches that would leave the exercise invalid.
    pub fn check(&self) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be blank".to_string());
        }
        if self.muscle_groups.as_ref().is_some_and(|g| g.is_empty()) {
            return Err("at least one muscle group is required".to_string());
        }
        Ok(())
    }

    /// Merge into `exercise`, returning the updated record.
    ///
    /// Patched values are normalized the same way as [`NewExercise::normalized`].
    pub fn apply(&self, exercise: &Exercise) -> Exercise {
        let mut updated = exercise.clone();
        if let Some(name) = &self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(groups) = &self.muscle_groups {
            updated.muscle_groups = dedup_groups(groups.clone());
        }
        if let Some(equipment) = self.equipment {
            updated.equipment = equipment;
        }
        if let Some(notes) = &self.notes {
            updated.notes = non_blank(notes.clone());
        }
        updated
    }
}

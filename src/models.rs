// src/models.rs
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use uuid::Uuid;

/// Current time truncated to the millisecond precision the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lifecycle of a workout. Stored and displayed in camelCase (`inProgress`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum WorkoutStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkoutStatus {
    /// `completed` and `cancelled` accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Forward edges of the lifecycle: planned -> {inProgress, cancelled},
    /// inProgress -> {completed, cancelled}.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::InProgress)
                | (Self::Planned, Self::Cancelled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Cancelled)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Workout {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub id: String,
    pub from: WorkoutStatus,
    pub to: WorkoutStatus,
}

/// One set of an exercise: `weight` x `reps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub workout_exercise_id: String,
    pub set_number: u32, // 1-based
    pub weight: f64,
    pub reps: u32,
    pub is_completed: bool,
}

impl WorkoutSet {
    /// Creates a set that is not yet attached to an exercise. `WorkoutExercise::with_set`
    /// fills in the owning exercise id.
    pub fn new(set_number: u32, weight: f64, reps: u32) -> Self {
        Self {
            workout_exercise_id: String::new(),
            set_number,
            weight,
            reps,
            is_completed: false,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_reps(mut self, reps: u32) -> Self {
        self.reps = reps;
        self
    }

    #[must_use]
    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

/// Read-only entry of an external exercise catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub body_parts: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}

/// An exercise performed within one workout, owning its sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String, // Catalog reference
    pub exercise_name: String,
    pub body_parts: Vec<String>,
    pub order_index: u32,
    pub sets: Vec<WorkoutSet>,
}

impl WorkoutExercise {
    pub fn new(
        workout_id: &str,
        exercise_id: &str,
        exercise_name: &str,
        order_index: u32,
    ) -> Self {
        Self {
            id: new_id(),
            workout_id: workout_id.to_string(),
            exercise_id: exercise_id.to_string(),
            exercise_name: exercise_name.to_string(),
            body_parts: Vec::new(),
            order_index,
            sets: Vec::new(),
        }
    }

    /// Builds an exercise entry from a catalog item, copying its name and body parts.
    pub fn from_catalog(entry: &CatalogExercise, workout_id: &str, order_index: u32) -> Self {
        Self::new(workout_id, &entry.id, &entry.name, order_index)
            .with_body_parts(entry.body_parts.clone())
    }

    #[must_use]
    pub fn with_body_parts(mut self, body_parts: Vec<String>) -> Self {
        self.body_parts = body_parts;
        self
    }

    #[must_use]
    pub fn with_order_index(mut self, order_index: u32) -> Self {
        self.order_index = order_index;
        self
    }

    /// Attaches `set` to this exercise. A set with the same number is replaced,
    /// and the list stays ordered by `set_number`.
    #[must_use]
    pub fn with_set(mut self, set: WorkoutSet) -> Self {
        let set = WorkoutSet {
            workout_exercise_id: self.id.clone(),
            ..set
        };
        self.sets.retain(|s| s.set_number != set.set_number);
        self.sets.push(set);
        self.sets.sort_by_key(|s| s.set_number);
        self
    }

    #[must_use]
    pub fn with_sets(self, sets: Vec<WorkoutSet>) -> Self {
        let cleared = Self {
            sets: Vec::new(),
            ..self
        };
        sets.into_iter().fold(cleared, Self::with_set)
    }

    /// Appends a set numbered after the current highest one.
    #[must_use]
    pub fn with_next_set(self, weight: f64, reps: u32) -> Self {
        let next = self.next_set_number();
        self.with_set(WorkoutSet::new(next, weight, reps))
    }

    pub fn next_set_number(&self) -> u32 {
        self.sets.iter().map(|s| s.set_number).max().unwrap_or(0) + 1
    }

    pub fn total_volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }
}

/// A planned or logged training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub body_parts: Vec<String>,
    pub planned_duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub status: WorkoutStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<WorkoutExercise>, // Ordered by order_index
}

impl Workout {
    /// Creates a new `planned` workout with a fresh id, stamped with the current time.
    pub fn new(user_id: &str, name: &str) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            body_parts: Vec::new(),
            planned_duration_minutes: 0,
            created_at: now_millis(),
            status: WorkoutStatus::Planned,
            started_at: None,
            completed_at: None,
            exercises: Vec::new(),
        }
    }

    /// Re-keys the workout, moving its exercises along. Exercise ids stay as they are,
    /// since they only need to be unique within one workout.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        let id = id.to_string();
        for exercise in &mut self.exercises {
            exercise.workout_id.clone_from(&id);
        }
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_body_parts(mut self, body_parts: Vec<String>) -> Self {
        self.body_parts = body_parts;
        self
    }

    #[must_use]
    pub fn with_planned_duration(mut self, minutes: u32) -> Self {
        self.planned_duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at.trunc_subsecs(3);
        self
    }

    /// Sets the status and timestamps directly, bypassing the lifecycle checks.
    /// Used when importing history; live logging goes through `transition`.
    #[must_use]
    pub fn with_status(
        mut self,
        status: WorkoutStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.status = status;
        self.started_at = started_at.map(|t| t.trunc_subsecs(3));
        self.completed_at = completed_at.map(|t| t.trunc_subsecs(3));
        self
    }

    /// Adds or replaces (same `order_index`) an exercise, keeping the list ordered.
    #[must_use]
    pub fn with_exercise(mut self, exercise: WorkoutExercise) -> Self {
        let exercise = WorkoutExercise {
            workout_id: self.id.clone(),
            ..exercise
        };
        self.exercises
            .retain(|e| e.order_index != exercise.order_index);
        self.exercises.push(exercise);
        self.exercises.sort_by_key(|e| e.order_index);
        self
    }

    #[must_use]
    pub fn with_exercises(self, exercises: Vec<WorkoutExercise>) -> Self {
        let cleared = Self {
            exercises: Vec::new(),
            ..self
        };
        exercises.into_iter().fold(cleared, Self::with_exercise)
    }

    pub fn next_order_index(&self) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.order_index + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn exercise_at(&self, order_index: u32) -> Option<&WorkoutExercise> {
        self.exercises.iter().find(|e| e.order_index == order_index)
    }

    /// Moves the workout to `next`, stamping `started_at` / `completed_at` with `at`.
    ///
    /// Same-state calls are no-ops and never re-stamp a timestamp. Anything that is not a
    /// forward edge of the lifecycle is rejected.
    /// # Errors
    /// Returns `TransitionError` for backward transitions and transitions out of a
    /// terminal state.
    pub fn transition(
        mut self,
        next: WorkoutStatus,
        at: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if self.status == next {
            return Ok(self);
        }
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        let at = at.trunc_subsecs(3);
        match next {
            WorkoutStatus::InProgress => {
                self.started_at = self.started_at.or(Some(at));
            }
            WorkoutStatus::Completed => self.completed_at = Some(at),
            WorkoutStatus::Planned | WorkoutStatus::Cancelled => {}
        }
        self.status = next;
        Ok(self)
    }

    /// `completed_at - started_at`, if the workout was both started and completed.
    pub fn actual_duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn actual_duration_minutes(&self) -> f64 {
        self.actual_duration()
            .map_or(0.0, |d| d.num_milliseconds() as f64 / 60_000.0)
    }

    pub fn total_volume(&self) -> f64 {
        self.exercises.iter().map(WorkoutExercise::total_volume).sum()
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Aggregates over a user's workout history. Not persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub completed_workouts: usize,
    pub completion_rate: f64,
    pub total_volume: f64, // Completed workouts only
    pub average_duration_minutes: f64,
}

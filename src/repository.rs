// src/repository.rs
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{self, DbError, WorkoutFilters};
use crate::models::{now_millis, TransitionError, Workout, WorkoutStats, WorkoutStatus};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Workout not found: ID {0}")]
    NotFound(String),
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("Identifier must not be empty: {0}")]
    EmptyIdentifier(&'static str),
    #[error("{kind} {id} belongs to '{owner}', expected '{expected}'")]
    MismatchedOwner {
        kind: &'static str,
        id: String,
        owner: String,
        expected: String,
    },
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Parameters of `get_workouts`. `limit`/`offset` paginate the newest-first listing.
#[derive(Default, Debug, Clone)]
pub struct WorkoutQuery<'a> {
    pub user_id: &'a str,
    pub status: Option<WorkoutStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn save_workout(&self, workout: &Workout) -> Result<(), RepositoryError>;
    async fn get_workout(&self, id: &str) -> Result<Option<Workout>, RepositoryError>;
    async fn update_workout(&self, workout: &Workout) -> Result<(), RepositoryError>;
    async fn delete_workout(&self, id: &str) -> Result<(), RepositoryError>;
    async fn start_workout(&self, id: &str) -> Result<(), RepositoryError>;
    async fn complete_workout(&self, id: &str) -> Result<(), RepositoryError>;
    async fn cancel_workout(&self, id: &str) -> Result<(), RepositoryError>;
    async fn get_workouts(&self, query: &WorkoutQuery<'_>) -> Result<Vec<Workout>, RepositoryError>;
    async fn get_workouts_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Workout>, RepositoryError>;
    async fn get_workout_stats(&self, user_id: &str) -> Result<WorkoutStats, RepositoryError>;
    async fn get_volume_by_body_part(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, f64>, RepositoryError>;
    async fn close(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}

/// `WorkoutRepository` over one SQLite connection, used sequentially by its owner.
/// Nothing is cached: every read goes back to the database.
pub struct SqliteWorkoutRepository {
    conn: Connection,
}

impl SqliteWorkoutRepository {
    /// Opens (creating if needed) the database at `path` and initializes the schema.
    /// # Errors
    /// Returns `DbError` if the file cannot be opened or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        Self::from_connection(db::open_db(path)?)
    }

    /// # Errors
    /// Returns `DbError` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Takes ownership of an already opened connection.
    /// # Errors
    /// Returns `DbError` if the schema cannot be created.
    pub fn from_connection(conn: Connection) -> Result<Self, DbError> {
        db::init_db(&conn)?;
        Ok(Self { conn })
    }

    fn validate(workout: &Workout) -> Result<(), RepositoryError> {
        if workout.id.trim().is_empty() {
            return Err(RepositoryError::EmptyIdentifier("workout id"));
        }
        if workout.user_id.trim().is_empty() {
            return Err(RepositoryError::EmptyIdentifier("user id"));
        }
        for exercise in &workout.exercises {
            if exercise.id.trim().is_empty() {
                return Err(RepositoryError::EmptyIdentifier("workout exercise id"));
            }
            if exercise.exercise_id.trim().is_empty() {
                return Err(RepositoryError::EmptyIdentifier("exercise id"));
            }
            // Stored rows are keyed by their parent, so a stray owner id would not round-trip
            if exercise.workout_id != workout.id {
                return Err(RepositoryError::MismatchedOwner {
                    kind: "Exercise",
                    id: exercise.id.clone(),
                    owner: exercise.workout_id.clone(),
                    expected: workout.id.clone(),
                });
            }
            if let Some(set) = exercise
                .sets
                .iter()
                .find(|s| s.workout_exercise_id != exercise.id)
            {
                return Err(RepositoryError::MismatchedOwner {
                    kind: "Set",
                    id: set.set_number.to_string(),
                    owner: set.workout_exercise_id.clone(),
                    expected: exercise.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn begin(&self) -> Result<Transaction<'_>, DbError> {
        self.conn
            .unchecked_transaction()
            .map_err(DbError::QueryFailed)
    }

    fn write(&self, workout: &Workout, must_exist: bool) -> Result<(), RepositoryError> {
        Self::validate(workout)?;
        let tx = self.begin()?;
        if must_exist && !db::workout_exists(&tx, &workout.id)? {
            return Err(RepositoryError::NotFound(workout.id.clone()));
        }
        db::write_workout(&tx, workout)?;
        tx.commit().map_err(DbError::UpdateFailed)?;
        Ok(())
    }

    fn transition(&self, id: &str, next: WorkoutStatus) -> Result<(), RepositoryError> {
        let tx = self.begin()?;
        let current = db::get_workout_shallow(&tx, id)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let from = current.status;

        let updated = current.transition(next, now_millis()).map_err(|e| {
            warn!(workout_id = id, from = %e.from, to = %e.to, "Rejected status transition");
            e
        })?;
        if from == next {
            debug!(workout_id = id, status = %next, "Status unchanged");
            return Ok(());
        }

        db::update_workout_status(&tx, &updated)?;
        tx.commit().map_err(DbError::UpdateFailed)?;
        info!(workout_id = id, from = %from, to = %next, "Workout status changed");
        Ok(())
    }
}

impl WorkoutRepository for SqliteWorkoutRepository {
    async fn save_workout(&self, workout: &Workout) -> Result<(), RepositoryError> {
        self.write(workout, false)
    }

    async fn get_workout(&self, id: &str) -> Result<Option<Workout>, RepositoryError> {
        Ok(db::get_workout(&self.conn, id)?)
    }

    async fn update_workout(&self, workout: &Workout) -> Result<(), RepositoryError> {
        self.write(workout, true)
    }

    async fn delete_workout(&self, id: &str) -> Result<(), RepositoryError> {
        if db::delete_workout(&self.conn, id)? == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        info!(workout_id = id, "Deleted workout");
        Ok(())
    }

    async fn start_workout(&self, id: &str) -> Result<(), RepositoryError> {
        self.transition(id, WorkoutStatus::InProgress)
    }

    async fn complete_workout(&self, id: &str) -> Result<(), RepositoryError> {
        self.transition(id, WorkoutStatus::Completed)
    }

    async fn cancel_workout(&self, id: &str) -> Result<(), RepositoryError> {
        self.transition(id, WorkoutStatus::Cancelled)
    }

    async fn get_workouts(&self, query: &WorkoutQuery<'_>) -> Result<Vec<Workout>, RepositoryError> {
        let filters = WorkoutFilters {
            user_id: query.user_id,
            status: query.status,
            limit: query.limit,
            offset: query.offset,
            ..Default::default()
        };
        Ok(db::list_workouts_filtered(&self.conn, &filters)?)
    }

    async fn get_workouts_by_date_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Workout>, RepositoryError> {
        let filters = WorkoutFilters {
            user_id,
            created_from: Some(start),
            created_to: Some(end),
            ..Default::default()
        };
        Ok(db::list_workouts_filtered(&self.conn, &filters)?)
    }

    async fn get_workout_stats(&self, user_id: &str) -> Result<WorkoutStats, RepositoryError> {
        // One read transaction so counts and volumes come from the same snapshot
        let tx = self.begin()?;
        let workouts = db::list_workouts_filtered(
            &tx,
            &WorkoutFilters {
                user_id,
                ..Default::default()
            },
        )?;
        tx.commit().map_err(DbError::QueryFailed)?;
        Ok(WorkoutStats::from_workouts(&workouts))
    }

    async fn get_volume_by_body_part(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<String, f64>, RepositoryError> {
        Ok(db::volume_by_body_part(&self.conn, user_id)?)
    }

    async fn close(self) -> Result<(), RepositoryError> {
        self.conn
            .close()
            .map_err(|(_, e)| RepositoryError::Store(DbError::Connection(e)))?;
        debug!("Closed workout database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_failure_is_query_error() {
        let repo = SqliteWorkoutRepository::open_in_memory().unwrap();
        // SQLite refuses a second BEGIN on the same connection
        let _outer = repo.begin().unwrap();

        let result = repo.save_workout(&Workout::new("user-1", "Legs")).await;
        assert!(matches!(
            result,
            Err(RepositoryError::Store(DbError::QueryFailed(_)))
        ));
        let result = repo.get_workout_stats("user-1").await;
        assert!(matches!(
            result,
            Err(RepositoryError::Store(DbError::QueryFailed(_)))
        ));
    }
}

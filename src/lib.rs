use anyhow::{bail, Context, Result};
// Use anyhow::Result as standard Result for service layer
use std::path::{Path, PathBuf};

// --- Declare modules ---
mod config;
pub mod db;
pub mod models;
pub mod repository;
pub mod stats;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme, Units,
};
pub use db::{get_db_path as get_db_path_util, DbError};
pub use models::{
    CatalogExercise, TransitionError, Workout, WorkoutExercise, WorkoutSet, WorkoutStats,
    WorkoutStatus,
};
pub use repository::{RepositoryError, SqliteWorkoutRepository, WorkoutQuery, WorkoutRepository};
pub use stats::format_volume;

pub struct AppService {
    pub config: Config,
    pub repository: SqliteWorkoutRepository,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => db::get_db_path().context("Failed to determine database path")?,
        };
        let repository = SqliteWorkoutRepository::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        Ok(Self {
            config,
            repository,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets the measurement units.
    /// # Errors
    /// Returns `ConfigError` variants if saving fails.
    pub fn set_units(&mut self, units: Units) -> Result<(), ConfigError> {
        self.config.units = units;
        self.save_config()
    }

    /// Resolves an optional `--user` argument against the configured default.
    pub fn user_or_default<'a>(&'a self, user: Option<&'a str>) -> &'a str {
        user.map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.config.default_user.as_str())
    }

    pub fn format_volume(&self, volume: f64) -> String {
        format_volume(volume, self.config.units.weight_label())
    }

    /// Creates and saves a new planned workout.
    /// # Errors
    /// Returns `anyhow::Error` if the name is empty or saving fails.
    pub async fn plan_workout(
        &self,
        user_id: &str,
        name: &str,
        body_parts: Vec<String>,
        planned_duration_minutes: u32,
    ) -> Result<Workout> {
        let trimmed_name = name.trim();
        if trimmed_name.is_empty() {
            bail!("Workout name cannot be empty.");
        }
        let workout = Workout::new(user_id, trimmed_name)
            .with_body_parts(body_parts)
            .with_planned_duration(planned_duration_minutes);
        self.repository
            .save_workout(&workout)
            .await
            .with_context(|| format!("Failed to save workout '{trimmed_name}'"))?;
        Ok(workout)
    }

    async fn require_workout(&self, workout_id: &str) -> Result<Workout> {
        self.repository
            .get_workout(workout_id)
            .await
            .with_context(|| format!("Failed to load workout {workout_id}"))?
            .ok_or_else(|| RepositoryError::NotFound(workout_id.to_string()).into())
    }

    /// Appends a catalog exercise to a workout, after its current last exercise.
    /// # Errors
    /// Returns `anyhow::Error` if the workout does not exist or the update fails.
    pub async fn add_exercise(
        &self,
        workout_id: &str,
        entry: &CatalogExercise,
    ) -> Result<Workout> {
        let workout = self.require_workout(workout_id).await?;
        let exercise =
            WorkoutExercise::from_catalog(entry, &workout.id, workout.next_order_index());
        let workout = workout.with_exercise(exercise);
        self.repository
            .update_workout(&workout)
            .await
            .with_context(|| format!("Failed to add '{}' to workout {workout_id}", entry.name))?;
        Ok(workout)
    }

    /// Logs the next set of the exercise at `order_index`.
    /// # Errors
    /// Returns `anyhow::Error` if the workout or exercise does not exist, or the update fails.
    pub async fn log_set(
        &self,
        workout_id: &str,
        order_index: u32,
        weight: f64,
        reps: u32,
        is_completed: bool,
    ) -> Result<Workout> {
        if !weight.is_finite() || weight < 0.0 {
            bail!("Weight must be a non-negative number, got {weight}.");
        }
        let workout = self.require_workout(workout_id).await?;
        let Some(exercise) = workout.exercise_at(order_index).cloned() else {
            bail!("Workout {workout_id} has no exercise at position {order_index}.");
        };
        let set_number = exercise.next_set_number();
        let exercise = exercise
            .with_set(WorkoutSet::new(set_number, weight, reps).with_completed(is_completed));
        let workout = workout.with_exercise(exercise);
        self.repository
            .update_workout(&workout)
            .await
            .with_context(|| format!("Failed to log set for workout {workout_id}"))?;
        Ok(workout)
    }

    /// Closes the database connection.
    /// # Errors
    /// Returns `anyhow::Error` if SQLite reports an error while closing.
    pub async fn close(self) -> Result<()> {
        self.repository
            .close()
            .await
            .context("Failed to close database")
    }
}

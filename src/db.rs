// src/db.rs
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{named_params, params, Connection, OptionalExtension, Row, ToSql};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::{Workout, WorkoutExercise, WorkoutSet, WorkoutStatus};

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database update failed: {0}")]
    UpdateFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
    #[error("Failed to (de)serialize body part list: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid data in database: {0}")]
    InvalidData(String),
}

const DB_FILE_NAME: &str = "workouts.sqlite";
const APP_DATA_DIR: &str = "workout-journal";

/// Gets the path to the SQLite database file within the app's data directory.
pub fn get_db_path() -> Result<PathBuf, DbError> {
    let data_dir = dirs::data_dir().ok_or(DbError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database with foreign keys enforced.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, DbError> {
    let conn = Connection::open(path).map_err(DbError::Connection)?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

/// Opens a private in-memory database, mostly useful for tests.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory().map_err(DbError::Connection)?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

// Cascading deletes rely on this; SQLite leaves it off per connection.
fn enable_foreign_keys(conn: &Connection) -> Result<(), DbError> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(DbError::Connection)
}

/// Initializes the database tables if they don't exist.
pub fn init_db(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workouts (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            body_parts TEXT NOT NULL, -- JSON array, order preserved
            planned_duration_minutes INTEGER NOT NULL,
            created_at INTEGER NOT NULL, -- Unix epoch milliseconds
            status TEXT NOT NULL CHECK(status IN ('planned', 'inProgress', 'completed', 'cancelled')),
            started_at INTEGER,
            completed_at INTEGER
        );

        -- Exercise ids are scoped to their workout, so copies keep them
        CREATE TABLE IF NOT EXISTS workout_exercises (
            id TEXT NOT NULL,
            workout_id TEXT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
            exercise_id TEXT NOT NULL, -- Catalog reference, not a foreign key
            exercise_name TEXT NOT NULL,
            body_parts TEXT NOT NULL,
            order_index INTEGER NOT NULL,
            PRIMARY KEY (workout_id, id),
            UNIQUE(workout_id, order_index)
        );

        CREATE TABLE IF NOT EXISTS workout_sets (
            workout_id TEXT NOT NULL,
            workout_exercise_id TEXT NOT NULL,
            set_number INTEGER NOT NULL,
            weight REAL NOT NULL,
            reps INTEGER NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (workout_id, workout_exercise_id, set_number),
            FOREIGN KEY (workout_id, workout_exercise_id)
                REFERENCES workout_exercises(workout_id, id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_workouts_user_created ON workouts(user_id, created_at);",
    )
    .map_err(DbError::Connection)
}

// --- Row <-> entity mapping ---

fn timestamp_to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn millis_to_timestamp(ms: i64) -> Result<DateTime<Utc>, DbError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| DbError::InvalidData(format!("timestamp out of range: {ms}")))
}

fn body_parts_to_json(body_parts: &[String]) -> Result<String, DbError> {
    serde_json::to_string(body_parts).map_err(DbError::Serialization)
}

fn body_parts_from_json(json: &str) -> Result<Vec<String>, DbError> {
    serde_json::from_str(json).map_err(DbError::Serialization)
}

fn column_to_u32(value: i64, column: &str) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_| DbError::InvalidData(format!("{column} out of range: {value}")))
}

/// Stored form of a `Workout` without its exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub body_parts: String,
    pub planned_duration_minutes: i64,
    pub created_at: i64,
    pub status: String,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl WorkoutRow {
    pub fn from_entity(workout: &Workout) -> Result<Self, DbError> {
        Ok(Self {
            id: workout.id.clone(),
            user_id: workout.user_id.clone(),
            name: workout.name.clone(),
            body_parts: body_parts_to_json(&workout.body_parts)?,
            planned_duration_minutes: i64::from(workout.planned_duration_minutes),
            created_at: timestamp_to_millis(workout.created_at),
            status: workout.status.to_string(),
            started_at: workout.started_at.map(timestamp_to_millis),
            completed_at: workout.completed_at.map(timestamp_to_millis),
        })
    }

    pub fn from_sql_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            body_parts: row.get("body_parts")?,
            planned_duration_minutes: row.get("planned_duration_minutes")?,
            created_at: row.get("created_at")?,
            status: row.get("status")?,
            started_at: row.get("started_at")?,
            completed_at: row.get("completed_at")?,
        })
    }

    pub fn into_entity(self, exercises: Vec<WorkoutExercise>) -> Result<Workout, DbError> {
        let status = WorkoutStatus::from_str(&self.status)
            .map_err(|_| DbError::InvalidData(format!("unknown workout status '{}'", self.status)))?;
        Ok(Workout {
            body_parts: body_parts_from_json(&self.body_parts)?,
            planned_duration_minutes: column_to_u32(
                self.planned_duration_minutes,
                "planned_duration_minutes",
            )?,
            created_at: millis_to_timestamp(self.created_at)?,
            status,
            started_at: self.started_at.map(millis_to_timestamp).transpose()?,
            completed_at: self.completed_at.map(millis_to_timestamp).transpose()?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            exercises,
        })
    }
}

/// Stored form of a `WorkoutExercise` without its sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRow {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub body_parts: String,
    pub order_index: i64,
}

impl ExerciseRow {
    pub fn from_entity(exercise: &WorkoutExercise) -> Result<Self, DbError> {
        Ok(Self {
            id: exercise.id.clone(),
            workout_id: exercise.workout_id.clone(),
            exercise_id: exercise.exercise_id.clone(),
            exercise_name: exercise.exercise_name.clone(),
            body_parts: body_parts_to_json(&exercise.body_parts)?,
            order_index: i64::from(exercise.order_index),
        })
    }

    pub fn from_sql_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_id: row.get("workout_id")?,
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            body_parts: row.get("body_parts")?,
            order_index: row.get("order_index")?,
        })
    }

    pub fn into_entity(self, sets: Vec<WorkoutSet>) -> Result<WorkoutExercise, DbError> {
        Ok(WorkoutExercise {
            body_parts: body_parts_from_json(&self.body_parts)?,
            order_index: column_to_u32(self.order_index, "order_index")?,
            id: self.id,
            workout_id: self.workout_id,
            exercise_id: self.exercise_id,
            exercise_name: self.exercise_name,
            sets,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetRow {
    pub workout_id: String,
    pub workout_exercise_id: String,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
    pub is_completed: bool,
}

impl SetRow {
    /// Sets carry no workout id of their own; `workout_id` is the parent workout.
    pub fn from_entity(set: &WorkoutSet, workout_id: &str) -> Self {
        Self {
            workout_id: workout_id.to_string(),
            workout_exercise_id: set.workout_exercise_id.clone(),
            set_number: i64::from(set.set_number),
            weight: set.weight,
            reps: i64::from(set.reps),
            is_completed: set.is_completed,
        }
    }

    pub fn from_sql_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            workout_id: row.get("workout_id")?,
            workout_exercise_id: row.get("workout_exercise_id")?,
            set_number: row.get("set_number")?,
            weight: row.get("weight")?,
            reps: row.get("reps")?,
            is_completed: row.get("is_completed")?,
        })
    }

    pub fn into_entity(self) -> Result<WorkoutSet, DbError> {
        Ok(WorkoutSet {
            set_number: column_to_u32(self.set_number, "set_number")?,
            reps: column_to_u32(self.reps, "reps")?,
            workout_exercise_id: self.workout_exercise_id,
            weight: self.weight,
            is_completed: self.is_completed,
        })
    }
}

// --- Writes ---

/// Makes sure the owning user row exists.
pub fn ensure_user(conn: &Connection, user_id: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR IGNORE INTO users (id) VALUES (?1)",
        params![user_id],
    )
    .map_err(DbError::InsertFailed)?;
    Ok(())
}

/// Upserts the workout row and replaces all of its exercises and sets.
/// Nested owner ids are written as given; callers check them against `workout.id`
/// and wrap this in a transaction.
pub fn write_workout(conn: &Connection, workout: &Workout) -> Result<(), DbError> {
    ensure_user(conn, &workout.user_id)?;

    let row = WorkoutRow::from_entity(workout)?;
    conn.execute(
        "INSERT INTO workouts (id, user_id, name, body_parts, planned_duration_minutes, created_at, status, started_at, completed_at)
         VALUES (:id, :user_id, :name, :body_parts, :planned, :created_at, :status, :started_at, :completed_at)
         ON CONFLICT(id) DO UPDATE SET
            user_id = excluded.user_id,
            name = excluded.name,
            body_parts = excluded.body_parts,
            planned_duration_minutes = excluded.planned_duration_minutes,
            created_at = excluded.created_at,
            status = excluded.status,
            started_at = excluded.started_at,
            completed_at = excluded.completed_at",
        named_params! {
            ":id": row.id,
            ":user_id": row.user_id,
            ":name": row.name,
            ":body_parts": row.body_parts,
            ":planned": row.planned_duration_minutes,
            ":created_at": row.created_at,
            ":status": row.status,
            ":started_at": row.started_at,
            ":completed_at": row.completed_at,
        },
    )
    .map_err(DbError::InsertFailed)?;

    // Sets go with their exercises through ON DELETE CASCADE
    conn.execute(
        "DELETE FROM workout_exercises WHERE workout_id = ?1",
        params![workout.id],
    )
    .map_err(DbError::DeleteFailed)?;

    let mut insert_exercise = conn
        .prepare_cached(
            "INSERT INTO workout_exercises (id, workout_id, exercise_id, exercise_name, body_parts, order_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(DbError::InsertFailed)?;
    let mut insert_set = conn
        .prepare_cached(
            "INSERT INTO workout_sets (workout_id, workout_exercise_id, set_number, weight, reps, is_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(DbError::InsertFailed)?;

    for exercise in &workout.exercises {
        let ex_row = ExerciseRow::from_entity(exercise)?;
        insert_exercise
            .execute(params![
                ex_row.id,
                ex_row.workout_id,
                ex_row.exercise_id,
                ex_row.exercise_name,
                ex_row.body_parts,
                ex_row.order_index,
            ])
            .map_err(DbError::InsertFailed)?;

        for set in &exercise.sets {
            let set_row = SetRow::from_entity(set, &ex_row.workout_id);
            insert_set
                .execute(params![
                    set_row.workout_id,
                    set_row.workout_exercise_id,
                    set_row.set_number,
                    set_row.weight,
                    set_row.reps,
                    set_row.is_completed,
                ])
                .map_err(DbError::InsertFailed)?;
        }
    }

    debug!(
        workout_id = %workout.id,
        exercises = workout.exercises.len(),
        sets = workout.set_count(),
        "Wrote workout graph"
    );
    Ok(())
}

/// Writes only the lifecycle columns of an existing workout.
pub fn update_workout_status(conn: &Connection, workout: &Workout) -> Result<usize, DbError> {
    conn.execute(
        "UPDATE workouts SET status = :status, started_at = :started_at, completed_at = :completed_at
         WHERE id = :id",
        named_params! {
            ":status": workout.status.to_string(),
            ":started_at": workout.started_at.map(timestamp_to_millis),
            ":completed_at": workout.completed_at.map(timestamp_to_millis),
            ":id": workout.id,
        },
    )
    .map_err(DbError::UpdateFailed)
}

/// Deletes a workout; its exercises and sets cascade.
pub fn delete_workout(conn: &Connection, id: &str) -> Result<usize, DbError> {
    conn.execute("DELETE FROM workouts WHERE id = ?1", params![id])
        .map_err(DbError::DeleteFailed)
}

// --- Reads ---

const WORKOUT_COLUMNS: &str = "id, user_id, name, body_parts, planned_duration_minutes, created_at, status, started_at, completed_at";

pub fn workout_exists(conn: &Connection, id: &str) -> Result<bool, DbError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM workouts WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
    .map_err(DbError::QueryFailed)
}

/// Retrieves a workout without its exercises.
pub fn get_workout_shallow(conn: &Connection, id: &str) -> Result<Option<Workout>, DbError> {
    let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], WorkoutRow::from_sql_row)
        .optional()
        .map_err(DbError::QueryFailed)?;
    row.map(|r| r.into_entity(Vec::new())).transpose()
}

/// Retrieves a fully hydrated workout (exercises ordered by `order_index`, sets by `set_number`).
pub fn get_workout(conn: &Connection, id: &str) -> Result<Option<Workout>, DbError> {
    let sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], WorkoutRow::from_sql_row)
        .optional()
        .map_err(DbError::QueryFailed)?;
    row.map(|r| hydrate_workout(conn, r)).transpose()
}

fn hydrate_workout(conn: &Connection, row: WorkoutRow) -> Result<Workout, DbError> {
    let exercises = load_exercises(conn, &row.id)?;
    row.into_entity(exercises)
}

fn load_exercises(conn: &Connection, workout_id: &str) -> Result<Vec<WorkoutExercise>, DbError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, workout_id, exercise_id, exercise_name, body_parts, order_index
             FROM workout_exercises WHERE workout_id = ?1 ORDER BY order_index ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map(params![workout_id], ExerciseRow::from_sql_row)
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;

    rows.into_iter()
        .map(|row| {
            let sets = load_sets(conn, &row.workout_id, &row.id)?;
            row.into_entity(sets)
        })
        .collect()
}

fn load_sets(
    conn: &Connection,
    workout_id: &str,
    workout_exercise_id: &str,
) -> Result<Vec<WorkoutSet>, DbError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT workout_id, workout_exercise_id, set_number, weight, reps, is_completed
             FROM workout_sets WHERE workout_id = ?1 AND workout_exercise_id = ?2
             ORDER BY set_number ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let rows = stmt
        .query_map(params![workout_id, workout_exercise_id], SetRow::from_sql_row)
        .map_err(DbError::QueryFailed)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::QueryFailed)?;

    rows.into_iter().map(SetRow::into_entity).collect()
}

#[derive(Default, Debug, Clone)]
pub struct WorkoutFilters<'a> {
    pub user_id: &'a str,
    pub status: Option<WorkoutStatus>,
    pub created_from: Option<DateTime<Utc>>, // Inclusive
    pub created_to: Option<DateTime<Utc>>,   // Inclusive
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Lists a user's workouts newest first (ties broken by id), hydrated.
pub fn list_workouts_filtered(
    conn: &Connection,
    filters: &WorkoutFilters,
) -> Result<Vec<Workout>, DbError> {
    let mut sql = format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = :user_id");
    let mut params_map: HashMap<String, Box<dyn ToSql>> = HashMap::new();
    params_map.insert(":user_id".into(), Box::new(filters.user_id.to_string()));

    if let Some(status) = filters.status {
        sql.push_str(" AND status = :status");
        params_map.insert(":status".into(), Box::new(status.to_string()));
    }
    if let Some(from) = filters.created_from {
        sql.push_str(" AND created_at >= :created_from");
        params_map.insert(":created_from".into(), Box::new(timestamp_to_millis(from)));
    }
    if let Some(to) = filters.created_to {
        sql.push_str(" AND created_at <= :created_to");
        params_map.insert(":created_to".into(), Box::new(timestamp_to_millis(to)));
    }

    sql.push_str(" ORDER BY created_at DESC, id ASC");

    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
    if filters.limit.is_some() || filters.offset.is_some() {
        sql.push_str(" LIMIT :limit OFFSET :offset");
        params_map.insert(
            ":limit".into(),
            Box::new(filters.limit.map_or(-1, i64::from)),
        );
        params_map.insert(":offset".into(), Box::new(filters.offset.unwrap_or(0)));
    }

    let params_for_query: Vec<(&str, &dyn ToSql)> = params_map
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_ref()))
        .collect();

    let rows = {
        let mut stmt = conn.prepare(&sql).map_err(DbError::QueryFailed)?;
        let row_iter = stmt
            .query_map(params_for_query.as_slice(), WorkoutRow::from_sql_row)
            .map_err(DbError::QueryFailed)?;
        row_iter
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::QueryFailed)?
    };

    debug!(user_id = filters.user_id, rows = rows.len(), "Listed workouts");
    rows.into_iter()
        .map(|row| hydrate_workout(conn, row))
        .collect()
}

/// Sums set volume per body-part tag over every workout of the user.
/// A set whose exercise carries several tags counts fully towards each of them,
/// and a tag repeated on one exercise counts once.
pub fn volume_by_body_part(
    conn: &Connection,
    user_id: &str,
) -> Result<BTreeMap<String, f64>, DbError> {
    let mut stmt = conn
        .prepare(
            "SELECT t.body_part, SUM(v.volume) AS volume
             FROM (
                SELECT DISTINCT e.workout_id, e.id AS exercise_id, tag.value AS body_part
                FROM workout_exercises e
                JOIN workouts w ON e.workout_id = w.id,
                json_each(e.body_parts) tag
                WHERE w.user_id = ?1
             ) t
             JOIN (
                SELECT workout_id, workout_exercise_id, SUM(weight * reps) AS volume
                FROM workout_sets
                GROUP BY workout_id, workout_exercise_id
             ) v ON v.workout_id = t.workout_id AND v.workout_exercise_id = t.exercise_id
             GROUP BY t.body_part
             ORDER BY t.body_part ASC",
        )
        .map_err(DbError::QueryFailed)?;
    let volume_iter = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(DbError::QueryFailed)?;

    volume_iter
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(DbError::QueryFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutStatus;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_workout() -> Workout {
        let start = Utc.timestamp_millis_opt(1_714_555_200_123).unwrap();
        let workout = Workout::new("user-1", "Upper")
            .with_body_parts(vec!["chest".into(), "back, upper".into()])
            .with_planned_duration(75)
            .with_created_at(start)
            .with_status(
                WorkoutStatus::Completed,
                Some(start),
                Some(start + chrono::Duration::milliseconds(3_600_457)),
            );
        let exercise = WorkoutExercise::new(&workout.id, "0025", "Bench Press", 0)
            .with_body_parts(vec!["chest".into(), "triceps".into()])
            .with_next_set(82.5, 8)
            .with_set(WorkoutSet::new(2, 80.0, 6).with_completed(true));
        workout.with_exercise(exercise)
    }

    #[test]
    fn test_workout_row_round_trip() {
        let workout = sample_workout();
        let row = WorkoutRow::from_entity(&workout).unwrap();
        assert_eq!(row.status, "completed");
        assert_eq!(row.body_parts, r#"["chest","back, upper"]"#);
        assert_eq!(row.created_at, 1_714_555_200_123);

        let back = row.into_entity(workout.exercises.clone()).unwrap();
        assert_eq!(back, workout);
    }

    #[test]
    fn test_exercise_and_set_row_round_trip() {
        let workout = sample_workout();
        let exercise = &workout.exercises[0];

        let sets = exercise
            .sets
            .iter()
            .map(|s| SetRow::from_entity(s, &workout.id).into_entity())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let back = ExerciseRow::from_entity(exercise)
            .unwrap()
            .into_entity(sets)
            .unwrap();
        assert_eq!(&back, exercise);
    }

    #[test]
    fn test_invalid_status_rejected() {
        let mut row = WorkoutRow::from_entity(&sample_workout()).unwrap();
        row.status = "paused".into();
        assert!(matches!(
            row.into_entity(Vec::new()),
            Err(DbError::InvalidData(_))
        ));
    }

    #[test]
    fn test_negative_column_rejected() {
        let row = SetRow {
            workout_id: "w".into(),
            workout_exercise_id: "x".into(),
            set_number: 1,
            weight: 20.0,
            reps: -3,
            is_completed: false,
        };
        assert!(matches!(row.into_entity(), Err(DbError::InvalidData(_))));
    }

    #[test]
    fn test_write_and_read_back() {
        let conn = open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let workout = sample_workout();

        write_workout(&conn, &workout).unwrap();
        assert!(workout_exists(&conn, &workout.id).unwrap());
        assert_eq!(get_workout(&conn, &workout.id).unwrap(), Some(workout.clone()));

        let shallow = get_workout_shallow(&conn, &workout.id).unwrap().unwrap();
        assert!(shallow.exercises.is_empty());
        assert_eq!(shallow.status, WorkoutStatus::Completed);
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let conn = open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
    }
}

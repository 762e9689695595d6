// src/cli.rs
use chrono::NaiveDate;
use clap::{Command, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan, log and review weight-lifting workouts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// User the command applies to (defaults to `default_user` from the config file)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Print list, range and volume output as CSV instead of a table
    #[arg(long, global = true)]
    pub export_csv: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCli {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitsCli {
    Metric,
    Imperial,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a new workout
    Plan {
        /// Name of the workout (e.g., "Push Day")
        #[arg(short, long)]
        name: String,
        /// Comma-separated list of targeted body parts (e.g., "chest,shoulders")
        #[arg(short, long)]
        body_parts: Option<String>,
        /// Planned duration in minutes
        #[arg(short, long, default_value_t = 60)]
        duration: u32,
    },
    /// Append an exercise to a workout
    AddExercise {
        /// ID of the workout
        workout_id: String,
        /// Catalog ID of the exercise
        #[arg(short, long)]
        exercise_id: String,
        /// Display name of the exercise (e.g., "Barbell Bench Press")
        #[arg(short, long)]
        name: String,
        /// Comma-separated list of body parts the exercise targets
        #[arg(short, long)]
        body_parts: Option<String>,
        /// Equipment used, as listed in the catalog
        #[arg(long)]
        equipment: Option<String>,
    },
    /// Log the next set of an exercise
    LogSet {
        /// ID of the workout
        workout_id: String,
        /// Position of the exercise within the workout (0-based)
        #[arg(short, long, default_value_t = 0)]
        order: u32,
        /// Weight lifted
        #[arg(short, long)]
        weight: f64,
        /// Repetitions performed
        #[arg(short, long)]
        reps: u32,
        /// Record the set without marking it completed
        #[arg(long)]
        incomplete: bool,
    },
    /// Mark a planned workout as in progress
    Start { workout_id: String },
    /// Mark an in-progress workout as completed
    Complete { workout_id: String },
    /// Cancel a planned or in-progress workout
    Cancel { workout_id: String },
    /// Delete a workout with all of its exercises and sets
    Delete { workout_id: String },
    /// Show one workout with its exercises and sets
    Show { workout_id: String },
    /// List workouts, newest first
    List {
        /// Only show workouts with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusCli>,
        /// Show at most N workouts (defaults to `default_list_limit` from the config file)
        #[arg(short, long)]
        limit: Option<u32>,
        /// Skip the first N workouts
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List workouts created between two dates (inclusive)
    Range {
        /// First day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
    },
    /// Show completion rate, volume and average duration
    Stats,
    /// Show total volume per body part
    Volume,
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    /// Set the units used for display
    SetUnits {
        #[arg(value_enum)]
        units: UnitsCli,
    },
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Splits a comma-separated argument into trimmed, non-empty tags, keeping their order.
pub fn split_tags(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> Command {
    Cli::command()
}

//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::collections::BTreeMap;
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

use workout_journal_lib::{
    AppService, CatalogExercise, Units, Workout, WorkoutQuery, WorkoutRepository, WorkoutStats,
    WorkoutStatus,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = cli::parse_args(); // Parse arguments once
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let user_id = service.user_or_default(cli_args.user.as_deref()).to_string();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Plan {
            name,
            body_parts,
            duration,
        } => {
            let tags = cli::split_tags(body_parts.as_deref());
            let workout = service
                .plan_workout(&user_id, &name, tags, duration)
                .await?;
            println!(
                "Planned workout '{}' ({} min) ID: {}",
                workout.name, workout.planned_duration_minutes, workout.id
            );
        }
        cli::Commands::AddExercise {
            workout_id,
            exercise_id,
            name,
            body_parts,
            equipment,
        } => {
            let entry = CatalogExercise {
                id: exercise_id.trim().to_string(),
                name: name.trim().to_string(),
                body_parts: cli::split_tags(body_parts.as_deref()),
                equipment,
            };
            let workout = service.add_exercise(&workout_id, &entry).await?;
            println!(
                "Added '{}' to '{}' at position {}.",
                entry.name,
                workout.name,
                workout.next_order_index() - 1
            );
        }
        cli::Commands::LogSet {
            workout_id,
            order,
            weight,
            reps,
            incomplete,
        } => {
            let workout = service
                .log_set(&workout_id, order, weight, reps, !incomplete)
                .await?;
            if let Some(exercise) = workout.exercise_at(order) {
                println!(
                    "Logged set {} of '{}': {} {} x {}",
                    exercise.next_set_number() - 1,
                    exercise.exercise_name,
                    weight,
                    service.config.units.weight_label(),
                    reps
                );
            }
        }
        cli::Commands::Start { workout_id } => {
            service.repository.start_workout(&workout_id).await?;
            println!("Workout {workout_id} started.");
        }
        cli::Commands::Complete { workout_id } => {
            service.repository.complete_workout(&workout_id).await?;
            if let Some(workout) = service.repository.get_workout(&workout_id).await? {
                println!(
                    "Workout '{}' completed in {:.0} min, volume {}.",
                    workout.name,
                    workout.actual_duration_minutes(),
                    service.format_volume(workout.total_volume())
                );
            }
        }
        cli::Commands::Cancel { workout_id } => {
            service.repository.cancel_workout(&workout_id).await?;
            println!("Workout {workout_id} cancelled.");
        }
        cli::Commands::Delete { workout_id } => {
            service.repository.delete_workout(&workout_id).await?;
            println!("Deleted workout {workout_id} with its exercises and sets.");
        }
        cli::Commands::Show { workout_id } => {
            match service.repository.get_workout(&workout_id).await? {
                Some(workout) => print_workout_detail(&workout, &service),
                None => bail!("No workout with ID {workout_id}."),
            }
        }
        cli::Commands::List {
            status,
            limit,
            offset,
        } => {
            let query = WorkoutQuery {
                user_id: &user_id,
                status: status.map(cli_status_to_status),
                limit: Some(limit.unwrap_or(service.config.default_list_limit)),
                offset: Some(offset),
            };
            let workouts = service.repository.get_workouts(&query).await?;
            print_workouts(&workouts, &service, export_csv)?;
        }
        cli::Commands::Range { from, to } => {
            if to < from {
                bail!("--to ({to}) is before --from ({from}).");
            }
            let start = Utc.from_utc_datetime(&from.and_time(NaiveTime::MIN));
            let end = Utc.from_utc_datetime(&end_of_day(to)?);
            let workouts = service
                .repository
                .get_workouts_by_date_range(&user_id, start, end)
                .await?;
            print_workouts(&workouts, &service, export_csv)?;
        }
        cli::Commands::Stats => {
            let stats = service.repository.get_workout_stats(&user_id).await?;
            print_stats(&stats, &service);
        }
        cli::Commands::Volume => {
            let volume = service.repository.get_volume_by_body_part(&user_id).await?;
            if export_csv {
                print_volume_csv(&volume, service.config.units)?;
            } else {
                print_volume_table(&volume, &service);
            }
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
        cli::Commands::SetUnits { units } => {
            let units = match units {
                cli::UnitsCli::Metric => Units::Metric,
                cli::UnitsCli::Imperial => Units::Imperial,
            };
            service.set_units(units)?;
            println!("Units set to {units:?}.");
        }
    }

    service.close().await
}

fn cli_status_to_status(status: cli::StatusCli) -> WorkoutStatus {
    match status {
        cli::StatusCli::Planned => WorkoutStatus::Planned,
        cli::StatusCli::InProgress => WorkoutStatus::InProgress,
        cli::StatusCli::Completed => WorkoutStatus::Completed,
        cli::StatusCli::Cancelled => WorkoutStatus::Cancelled,
    }
}

fn end_of_day(date: NaiveDate) -> Result<chrono::NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| anyhow::anyhow!("Invalid date: {date}"))
}

fn format_timestamp(ts: Option<chrono::DateTime<Utc>>) -> String {
    ts.map_or("-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

// --- Table Printing Functions ---

fn print_workouts(workouts: &[Workout], service: &AppService, export_csv: bool) -> Result<()> {
    if export_csv {
        print_workout_csv(workouts, service.config.units)
    } else if workouts.is_empty() {
        println!("No workouts found.");
        Ok(())
    } else {
        print_workout_table(workouts, service);
        Ok(())
    }
}

/// Prints workouts in a formatted table.
fn print_workout_table(workouts: &[Workout], service: &AppService) {
    let header_color = service.config.theme.header();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Created (UTC)").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Status").fg(header_color),
            Cell::new("Body Parts").fg(header_color),
            Cell::new("Exercises").fg(header_color),
            Cell::new("Sets").fg(header_color),
            Cell::new("Volume").fg(header_color),
            Cell::new("Duration (min)").fg(header_color),
        ]);

    for workout in workouts {
        let duration = workout
            .actual_duration()
            .map_or("-".to_string(), |_| format!("{:.0}", workout.actual_duration_minutes()));
        table.add_row(vec![
            Cell::new(&workout.id),
            Cell::new(format_timestamp(Some(workout.created_at))),
            Cell::new(&workout.name),
            Cell::new(workout.status.to_string()).fg(status_color(workout.status)),
            Cell::new(workout.body_parts.join(", ")),
            Cell::new(workout.exercises.len()),
            Cell::new(workout.set_count()),
            Cell::new(service.format_volume(workout.total_volume())),
            Cell::new(duration),
        ]);
    }
    println!("{table}");
}

const fn status_color(status: WorkoutStatus) -> Color {
    match status {
        WorkoutStatus::Planned => Color::Blue,
        WorkoutStatus::InProgress => Color::Yellow,
        WorkoutStatus::Completed => Color::Green,
        WorkoutStatus::Cancelled => Color::DarkGrey,
    }
}

/// Prints one workout with each exercise and its sets.
fn print_workout_detail(workout: &Workout, service: &AppService) {
    let header_color = service.config.theme.header();
    let weight_unit = service.config.units.weight_label();

    println!("\n--- {} ({}) ---", workout.name, workout.status);
    println!("ID: {}", workout.id);
    println!("Created: {}", format_timestamp(Some(workout.created_at)));
    println!("Started: {}", format_timestamp(workout.started_at));
    println!("Completed: {}", format_timestamp(workout.completed_at));
    println!("Planned: {} min", workout.planned_duration_minutes);
    if !workout.body_parts.is_empty() {
        println!("Targets: {}", workout.body_parts.join(", "));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(header_color),
            Cell::new("Exercise").fg(header_color),
            Cell::new("Set").fg(header_color),
            Cell::new(format!("Weight ({weight_unit})")).fg(header_color),
            Cell::new("Reps").fg(header_color),
            Cell::new("Done").fg(header_color),
        ]);
    for exercise in &workout.exercises {
        if exercise.sets.is_empty() {
            table.add_row(vec![
                Cell::new(exercise.order_index),
                Cell::new(&exercise.exercise_name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ]);
        }
        for set in &exercise.sets {
            table.add_row(vec![
                Cell::new(exercise.order_index),
                Cell::new(&exercise.exercise_name),
                Cell::new(set.set_number),
                Cell::new(format!("{:.2}", set.weight)),
                Cell::new(set.reps),
                Cell::new(if set.is_completed { "yes" } else { "no" }),
            ]);
        }
    }
    println!("{table}");
    println!(
        "Total volume: {}",
        service.format_volume(workout.total_volume())
    );
}

fn print_stats(stats: &WorkoutStats, service: &AppService) {
    println!("\n--- Workout Statistics ---");
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Total Workouts").add_attribute(Attribute::Bold),
        Cell::new(stats.total_workouts),
    ]);
    table.add_row(vec![
        Cell::new("Completed Workouts").add_attribute(Attribute::Bold),
        Cell::new(stats.completed_workouts),
    ]);
    table.add_row(vec![
        Cell::new("Completion Rate").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}%", stats.completion_rate * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Total Volume").add_attribute(Attribute::Bold),
        Cell::new(service.format_volume(stats.total_volume)),
    ]);
    table.add_row(vec![
        Cell::new("Avg Duration").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.0} min", stats.average_duration_minutes)),
    ]);
    println!("{table}");
}

fn print_volume_table(volume: &BTreeMap<String, f64>, service: &AppService) {
    if volume.is_empty() {
        println!("No sets logged yet.");
        return;
    }
    let header_color = service.config.theme.header();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Body Part").fg(header_color),
            Cell::new(format!(
                "Volume (Reps*Weight {})",
                service.config.units.weight_label()
            ))
            .fg(header_color),
        ]);
    for (body_part, total) in volume {
        table.add_row(vec![Cell::new(body_part), Cell::new(format!("{total:.2}"))]);
    }
    println!("{table}");
}

fn print_workout_csv(workouts: &[Workout], units: Units) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let volume_header = format!("Volume_{}", units.weight_label());

    writer.write_record([
        "ID",
        "Created_UTC",
        "Name",
        "Status",
        "Body_Parts",
        "Exercises",
        "Sets",
        volume_header.as_str(),
        "Started_UTC",
        "Completed_UTC",
    ])?;

    for workout in workouts {
        writer.write_record(&[
            workout.id.clone(),
            workout.created_at.to_rfc3339(), // Use ISO 8601/RFC3339 for CSV
            workout.name.clone(),
            workout.status.to_string(),
            workout.body_parts.join(";"),
            workout.exercises.len().to_string(),
            workout.set_count().to_string(),
            format!("{:.2}", workout.total_volume()),
            workout.started_at.map_or(String::new(), |t| t.to_rfc3339()),
            workout.completed_at.map_or(String::new(), |t| t.to_rfc3339()),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn print_volume_csv(volume: &BTreeMap<String, f64>, units: Units) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let volume_header = format!("Volume_{}", units.weight_label());
    writer.write_record(["Body_Part", volume_header.as_str()])?;
    for (body_part, total) in volume {
        writer.write_record([body_part.clone(), format!("{total:.2}")])?;
    }
    writer.flush()?;
    Ok(())
}

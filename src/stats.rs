// src/stats.rs
use crate::models::{Workout, WorkoutStats, WorkoutStatus};

const DEFAULT_UNIT_LABEL: &str = "kg";

impl WorkoutStats {
    /// Aggregates `workouts` in a single pass. Volume and duration figures only
    /// consider `completed` workouts; durations only from workouts with both timestamps.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        let mut completed_workouts = 0usize;
        let mut total_volume = 0.0;
        let mut duration_sum = 0.0;
        let mut timed_workouts = 0usize;

        for workout in workouts {
            if workout.status != WorkoutStatus::Completed {
                continue;
            }
            completed_workouts += 1;
            total_volume += workout.total_volume();
            if workout.actual_duration().is_some() {
                duration_sum += workout.actual_duration_minutes();
                timed_workouts += 1;
            }
        }

        let total_workouts = workouts.len();
        let completion_rate = if total_workouts == 0 {
            0.0
        } else {
            completed_workouts as f64 / total_workouts as f64
        };
        let average_duration_minutes = if timed_workouts == 0 {
            0.0
        } else {
            duration_sum / timed_workouts as f64
        };

        Self {
            total_workouts,
            completed_workouts,
            completion_rate,
            total_volume,
            average_duration_minutes,
        }
    }

    /// Total volume for display, e.g. "2.0k kg".
    pub fn formatted_total_volume(&self) -> String {
        format_volume(self.total_volume, DEFAULT_UNIT_LABEL)
    }
}

/// Formats a volume figure: values below 1000 are rounded to whole units,
/// thousands and millions get one decimal and a `k` or `M` suffix.
/// The suffix is picked after rounding, so 999.6 reads "1.0k".
pub fn format_volume(volume: f64, unit_label: &str) -> String {
    let whole = volume.round();
    if whole < 1000.0 {
        return format!("{whole:.0} {unit_label}");
    }
    let thousands = (volume / 100.0).round() / 10.0;
    if thousands < 1000.0 {
        return format!("{thousands:.1}k {unit_label}");
    }
    let millions = (volume / 100_000.0).round() / 10.0;
    format!("{millions:.1}M {unit_label}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkoutExercise, WorkoutStatus};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn workout_with_volume(weight: f64, reps: u32) -> Workout {
        let workout = Workout::new("u1", "Session");
        let exercise =
            WorkoutExercise::new(&workout.id, "squat", "Squat", 0).with_next_set(weight, reps);
        workout.with_exercise(exercise)
    }

    fn completed(workout: Workout, minutes: i64) -> Workout {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        workout.with_status(
            WorkoutStatus::Completed,
            Some(start),
            Some(start + Duration::minutes(minutes)),
        )
    }

    #[test]
    fn test_empty_history() {
        let stats = WorkoutStats::from_workouts(&[]);
        assert_eq!(stats, WorkoutStats::default());
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_no_completed_workouts() {
        let workouts = vec![
            workout_with_volume(100.0, 5),
            workout_with_volume(60.0, 10),
            workout_with_volume(20.0, 20),
        ];
        let stats = WorkoutStats::from_workouts(&workouts);
        assert_eq!(stats.total_workouts, 3);
        assert_eq!(stats.completed_workouts, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.total_volume, 0.0);
        assert_eq!(stats.average_duration_minutes, 0.0);
    }

    #[test]
    fn test_only_completed_count_towards_volume_and_duration() {
        let workouts = vec![
            completed(workout_with_volume(100.0, 10), 60),
            completed(workout_with_volume(50.0, 10), 30),
            workout_with_volume(200.0, 10),
            workout_with_volume(10.0, 1).with_status(WorkoutStatus::Cancelled, None, None),
        ];
        let stats = WorkoutStats::from_workouts(&workouts);
        assert_eq!(stats.total_workouts, 4);
        assert_eq!(stats.completed_workouts, 2);
        assert_eq!(stats.completion_rate, 0.5);
        assert_eq!(stats.total_volume, 1500.0);
        assert_eq!(stats.average_duration_minutes, 45.0);
        assert_eq!(stats.formatted_total_volume(), "1.5k kg");
    }

    #[test]
    fn test_completed_without_timestamps_skipped_for_duration() {
        let workouts = vec![
            completed(workout_with_volume(10.0, 10), 40),
            workout_with_volume(10.0, 10).with_status(WorkoutStatus::Completed, None, None),
        ];
        let stats = WorkoutStats::from_workouts(&workouts);
        assert_eq!(stats.completed_workouts, 2);
        assert_eq!(stats.total_volume, 200.0);
        assert_eq!(stats.average_duration_minutes, 40.0);
    }

    #[rstest]
    #[case(0.0, "0 kg")]
    #[case(640.0, "640 kg")]
    #[case(999.4, "999 kg")]
    #[case(999.6, "1.0k kg")]
    #[case(1000.0, "1.0k kg")]
    #[case(2000.0, "2.0k kg")]
    #[case(2160.0, "2.2k kg")]
    #[case(999_949.0, "999.9k kg")]
    #[case(999_960.0, "1.0M kg")]
    #[case(2_450_000.0, "2.5M kg")]
    fn test_format_volume(#[case] volume: f64, #[case] expected: &str) {
        assert_eq!(format_volume(volume, "kg"), expected);
    }

    #[test]
    fn test_format_volume_unit_label() {
        assert_eq!(format_volume(12_500.0, "lbs"), "12.5k lbs");
    }
}

use crate::clients::models::common::{DayOfWeek, Exercise};
use crate::clients::models::responses::{PaginationMeta, Routine, Stats};
use crate::services::query::QueryState;
use crate::services::screen::{Notice, Severity};

pub fn format_routine_line(routine: &Routine) -> String {
    let days: Vec<&str> = DayOfWeek::ALL
        .iter()
        .filter(|day| routine.exercises.iter().any(|e| e.day_of_week == **day))
        .map(|day| day.as_str())
        .collect();

    let mut line = format!(
        "[{}] {} ({} exercises)",
        routine.id,
        routine.name,
        routine.exercises.len()
    );
    if !days.is_empty() {
        line.push_str(&format!(" | {}", days.join(", ")));
    }
    line
}

pub fn format_routine_detail(routine: &Routine) -> String {
    let mut output = format!("{}\n", routine.name);
    let description = routine
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description");
    output.push_str(&format!("{}\n", description));
    output.push_str(&format!(
        "Created: {}\n\n",
        routine.created_at.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format_week_calendar(&routine.exercises));
    output
}

/// Seven day blocks in week order, exercises sorted by their day order.
pub fn format_week_calendar(exercises: &[Exercise]) -> String {
    DayOfWeek::ALL
        .iter()
        .map(|day| {
            let mut day_exercises: Vec<&Exercise> =
                exercises.iter().filter(|e| e.day_of_week == *day).collect();
            day_exercises.sort_by_key(|e| e.order);

            let mut block = format!("{}:\n", day);
            if day_exercises.is_empty() {
                block.push_str("  No exercises\n");
            }
            for exercise in day_exercises {
                block.push_str(&format!(
                    "  #{} {} ({}x{}) {}\n",
                    exercise.order,
                    exercise.name,
                    exercise.series,
                    exercise.repetitions,
                    format_weight(exercise.weight)
                ));
                if let Some(notes) = exercise.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                    block.push_str(&format!("     {}\n", notes.trim()));
                }
            }
            block
        })
        .collect::<Vec<_>>()
        .join("")
}

fn format_weight(weight: Option<f64>) -> String {
    match weight {
        Some(value) if value.fract().abs() > f64::EPSILON => format!("{:.1}kg", value),
        Some(value) => format!("{:.0}kg", value),
        None => "-".to_string(),
    }
}

pub fn format_stats(stats: &Stats) -> String {
    let mut output = format!(
        "Routines: {} | Exercises: {}",
        stats.total_routines, stats.total_exercises
    );
    let per_day: Vec<String> = DayOfWeek::ALL
        .iter()
        .filter_map(|day| {
            stats
                .exercises_per_day
                .get(day.as_str())
                .map(|count| format!("{} {}", day, count))
        })
        .collect();
    if !per_day.is_empty() {
        output.push_str(&format!("\nPer day: {}", per_day.join(", ")));
    }
    output
}

pub fn format_pagination(meta: &PaginationMeta) -> String {
    format!(
        "Page {} of {} ({} routines)",
        meta.page, meta.pages, meta.total
    )
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.severity {
        Severity::Success => format!("ok: {}", notice.message),
        Severity::Error => format!("error: {}", notice.message),
    }
}

/// Full text of the home screen for the interactive browser.
pub fn format_home(query: &QueryState, stats: Option<&Stats>) -> String {
    let mut output = String::new();
    if let Some(stats) = stats {
        output.push_str(&format_stats(stats));
        output.push('\n');
    }

    let filter = query
        .day_filter()
        .map(|day| day.as_str())
        .unwrap_or("All days");
    if query.term().is_empty() {
        output.push_str(&format!("Browsing | {}\n", filter));
    } else {
        output.push_str(&format!("Search \"{}\" | {}\n", query.term(), filter));
    }

    if query.is_searching() {
        output.push_str("Searching...\n");
    }
    if let Some(error) = query.error() {
        output.push_str(&format!("error: {}\n", error));
    }

    let routines = query.displayed();
    if routines.is_empty() {
        output.push_str(query.empty_message());
        output.push('\n');
    }
    for routine in routines {
        output.push_str(&format_routine_line(routine));
        output.push('\n');
    }

    if query.show_pagination()
        && let Some(meta) = query.meta()
    {
        output.push_str(&format_pagination(meta));
        output.push('\n');
    }
    output
}

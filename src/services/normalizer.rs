use crate::clients::models::common::{DayOfWeek, Exercise};

/// Canonical submission form of a working exercise list.
///
/// Blank names are dropped, each weekday group is stably sorted by its current
/// `order` and renumbered `1..=k`, and the groups are concatenated Monday first.
/// Notes become a trimmed string (empty when absent); a missing weight stays
/// `None`.
pub fn normalize_exercises(exercises: &[Exercise]) -> Vec<Exercise> {
    DayOfWeek::ALL
        .iter()
        .flat_map(|day| {
            let mut group: Vec<&Exercise> = exercises
                .iter()
                .filter(|exercise| exercise.day_of_week == *day && !exercise.is_blank())
                .collect();
            // sort_by_key is stable, ties keep input position
            group.sort_by_key(|exercise| exercise.order);

            group
                .into_iter()
                .enumerate()
                .map(|(position, exercise)| Exercise {
                    order: position as i32 + 1,
                    notes: Some(
                        exercise
                            .notes
                            .as_deref()
                            .map(str::trim)
                            .unwrap_or_default()
                            .to_string(),
                    ),
                    ..exercise.clone()
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn exercise(name: &str, day: DayOfWeek, order: i32) -> Exercise {
        Exercise {
            name: name.to_string(),
            day_of_week: day,
            order,
            ..Exercise::blank(order)
        }
    }

    fn sample() -> Vec<Exercise> {
        vec![
            exercise("Remo", DayOfWeek::Jueves, 2),
            exercise("Sentadilla", DayOfWeek::Lunes, 5),
            exercise("   ", DayOfWeek::Lunes, 1),
            exercise("Press banca", DayOfWeek::Jueves, 2),
            exercise("Plancha", DayOfWeek::Domingo, 0),
            exercise("Zancadas", DayOfWeek::Lunes, 3),
            exercise("", DayOfWeek::Martes, 1),
            exercise("Curl", DayOfWeek::Martes, 9),
        ]
    }

    #[test]
    fn test_drops_blank_and_renumbers_per_day() {
        let input = vec![
            exercise("Sentadilla", DayOfWeek::Lunes, 5),
            exercise("  ", DayOfWeek::Lunes, 1),
            exercise("Curl", DayOfWeek::Martes, 9),
        ];

        let normalized = normalize_exercises(&input);

        let summary: Vec<(&str, DayOfWeek, i32)> = normalized
            .iter()
            .map(|e| (e.name.as_str(), e.day_of_week, e.order))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Sentadilla", DayOfWeek::Lunes, 1),
                ("Curl", DayOfWeek::Martes, 1),
            ]
        );
    }

    #[test]
    fn test_is_idempotent() {
        let once = normalize_exercises(&sample());
        let twice = normalize_exercises(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_orders_are_contiguous_per_day() {
        let normalized = normalize_exercises(&sample());

        for day in DayOfWeek::ALL {
            let orders: BTreeSet<i32> = normalized
                .iter()
                .filter(|e| e.day_of_week == day)
                .map(|e| e.order)
                .collect();
            let expected: BTreeSet<i32> = (1..=orders.len() as i32).collect();
            assert_eq!(orders, expected, "day {day}");
        }
        assert!(normalized.iter().all(|e| !e.name.trim().is_empty()));
    }

    #[test]
    fn test_groups_follow_week_order() {
        let normalized = normalize_exercises(&sample());
        let ranks: Vec<usize> = normalized.iter().map(|e| e.day_of_week.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_equal_orders_keep_input_position() {
        let normalized = normalize_exercises(&sample());
        let thursday: Vec<&str> = normalized
            .iter()
            .filter(|e| e.day_of_week == DayOfWeek::Jueves)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(thursday, vec!["Remo", "Press banca"]);
    }

    #[test]
    fn test_notes_trimmed_and_weight_left_unset() {
        let mut with_notes = exercise("Dominadas", DayOfWeek::Viernes, 1);
        with_notes.notes = Some("  lastre  ".to_string());
        with_notes.weight = Some(0.0);
        let mut without_notes = exercise("Fondos", DayOfWeek::Viernes, 2);
        without_notes.notes = None;

        let normalized = normalize_exercises(&[with_notes, without_notes]);

        assert_eq!(normalized[0].notes.as_deref(), Some("lastre"));
        assert_eq!(normalized[0].weight, Some(0.0));
        assert_eq!(normalized[1].notes.as_deref(), Some(""));
        assert_eq!(normalized[1].weight, None);
    }

    #[test]
    fn test_all_blank_yields_empty() {
        let input = vec![exercise(" ", DayOfWeek::Lunes, 1), exercise("", DayOfWeek::Sabado, 2)];
        assert!(normalize_exercises(&input).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = sample();
        let before = input.clone();
        let _ = normalize_exercises(&input);
        assert_eq!(input, before);
    }
}

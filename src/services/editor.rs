use thiserror::Error;

use crate::clients::models::common::Exercise;
use crate::clients::models::requests::RoutinePayload;
use crate::clients::models::responses::Routine;
use crate::services::normalizer::normalize_exercises;
use crate::services::reorder::{self, Direction};

/// Problems caught before a routine is sent; the request is never issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("routine name required")]
    NameRequired,
    #[error("at least one exercise required")]
    NoExercises,
    #[error("exercise {name:?}: series and repetitions must be positive and weight non-negative")]
    InvalidExercise { name: String },
}

/// Working state of the create/edit routine form.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineEditor {
    editing_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
}

impl Default for RoutineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineEditor {
    pub fn new() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            description: String::new(),
            exercises: vec![Exercise::blank(1)],
        }
    }

    /// Load an existing routine for editing, exercises grouped Monday first.
    pub fn from_routine(routine: &Routine) -> Self {
        let mut exercises: Vec<Exercise> = routine
            .exercises
            .iter()
            .map(|exercise| Exercise {
                notes: Some(exercise.notes.clone().unwrap_or_default()),
                ..exercise.clone()
            })
            .collect();
        exercises.sort_by_key(|exercise| exercise.day_of_week.rank());

        Self {
            editing_id: Some(routine.id),
            name: routine.name.clone(),
            description: routine.description.clone().unwrap_or_default(),
            exercises,
        }
    }

    /// Build an editor from a draft payload, e.g. one read from a file.
    pub fn from_payload(payload: RoutinePayload, editing_id: Option<i64>) -> Self {
        Self {
            editing_id,
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            exercises: payload.exercises,
        }
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn add_exercise(&mut self) {
        let order = self.exercises.len() as i32 + 1;
        self.exercises.push(Exercise::blank(order));
    }

    pub fn update_exercise(&mut self, index: usize, exercise: Exercise) {
        if let Some(slot) = self.exercises.get_mut(index) {
            *slot = exercise;
        }
    }

    pub fn remove_exercise(&mut self, index: usize) {
        if index < self.exercises.len() {
            self.exercises.remove(index);
        }
    }

    pub fn move_exercise(&mut self, index: usize, direction: Direction) {
        self.exercises = reorder::move_adjacent(&self.exercises, index, direction);
    }

    pub fn relocate_exercise(&mut self, from: usize, to: usize) {
        self.exercises = reorder::relocate(&self.exercises, from, to);
    }

    pub fn build_payload(&self) -> Result<RoutinePayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        let exercises = normalize_exercises(&self.exercises);
        if exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }

        if let Some(invalid) = exercises.iter().find(|exercise| {
            exercise.series <= 0 || exercise.repetitions <= 0 || exercise.weight.is_some_and(|w| w < 0.0)
        }) {
            return Err(ValidationError::InvalidExercise {
                name: invalid.name.trim().to_string(),
            });
        }

        Ok(RoutinePayload {
            name: name.to_string(),
            description: Some(self.description.trim().to_string()),
            exercises: exercises
                .into_iter()
                .map(|exercise| Exercise {
                    name: exercise.name.trim().to_string(),
                    ..exercise
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::models::common::DayOfWeek;
    use chrono::Utc;

    fn named(name: &str, day: DayOfWeek) -> Exercise {
        Exercise {
            name: name.to_string(),
            day_of_week: day,
            ..Exercise::blank(1)
        }
    }

    #[test]
    fn test_new_editor_starts_with_one_blank_exercise() {
        let editor = RoutineEditor::new();
        assert_eq!(editor.exercises.len(), 1);
        assert!(editor.exercises[0].is_blank());
        assert_eq!(editor.exercises[0].series, 3);
        assert_eq!(editor.exercises[0].repetitions, 10);
        assert_eq!(editor.editing_id(), None);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut editor = RoutineEditor::new();
        editor.exercises[0].name = "Sentadilla".to_string();
        editor.set_name("   ");

        let err = editor.build_payload().unwrap_err();
        assert_eq!(err, ValidationError::NameRequired);
        assert_eq!(err.to_string(), "routine name required");
    }

    #[test]
    fn test_only_blank_exercises_is_rejected() {
        let mut editor = RoutineEditor::new();
        editor.set_name("Pierna");
        editor.add_exercise();

        assert_eq!(editor.build_payload(), Err(ValidationError::NoExercises));
    }

    #[test]
    fn test_zero_series_is_rejected() {
        let mut editor = RoutineEditor::new();
        editor.set_name("Pierna");
        editor.exercises[0] = Exercise {
            series: 0,
            repetitions: 10,
            ..named("Prensa", DayOfWeek::Lunes)
        };

        assert!(matches!(
            editor.build_payload(),
            Err(ValidationError::InvalidExercise { ref name }) if name == "Prensa"
        ));
    }

    #[test]
    fn test_negative_weight_is_rejected_but_missing_weight_is_fine() {
        let mut editor = RoutineEditor::new();
        editor.set_name("Empuje");
        editor.exercises[0] = Exercise {
            weight: Some(-2.5),
            ..named("Press", DayOfWeek::Martes)
        };
        assert!(editor.build_payload().is_err());

        editor.exercises[0].weight = None;
        let payload = editor.build_payload().unwrap();
        assert_eq!(payload.exercises[0].weight, None);
    }

    #[test]
    fn test_payload_is_trimmed_and_normalized() {
        let mut editor = RoutineEditor::new();
        editor.set_name("  Torso  ");
        editor.set_description(" semana 1 ");
        editor.exercises[0] = named(" Remo ", DayOfWeek::Viernes);
        editor.add_exercise();
        editor.update_exercise(1, named("Press", DayOfWeek::Lunes));
        editor.add_exercise();

        let payload = editor.build_payload().unwrap();

        assert_eq!(payload.name, "Torso");
        assert_eq!(payload.description.as_deref(), Some("semana 1"));
        let names: Vec<&str> = payload.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Press", "Remo"]);
        assert!(payload.exercises.iter().all(|e| e.order == 1));
    }

    #[test]
    fn test_from_routine_sorts_by_day_and_keeps_identity() {
        let routine = Routine {
            id: 7,
            name: "Full body".to_string(),
            description: None,
            created_at: Utc::now(),
            exercises: vec![
                Exercise { id: Some(3), notes: None, ..named("Peso muerto", DayOfWeek::Domingo) },
                Exercise { id: Some(4), ..named("Dominadas", DayOfWeek::Lunes) },
            ],
        };

        let editor = RoutineEditor::from_routine(&routine);

        assert_eq!(editor.editing_id(), Some(7));
        assert_eq!(editor.description, "");
        assert_eq!(editor.exercises[0].id, Some(4));
        assert_eq!(editor.exercises[1].notes.as_deref(), Some(""));
    }

    #[test]
    fn test_reorder_then_remove() {
        let mut editor = RoutineEditor::new();
        editor.exercises = vec![
            named("A", DayOfWeek::Lunes),
            named("B", DayOfWeek::Lunes),
            named("C", DayOfWeek::Lunes),
        ];

        editor.relocate_exercise(0, 2);
        editor.move_exercise(0, Direction::Down);
        editor.remove_exercise(0);

        let names: Vec<&str> = editor.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}

//! Flat-list reordering for the routine editor.
//!
//! These operate on the single linear list the editor shows and know nothing
//! about weekdays; per-day order is re-derived by the normalizer on submit.

use crate::clients::models::common::Exercise;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Swap the entry at `index` with its neighbour. Only the two swapped entries
/// get a new `order` (their 1-based flat position). Moving past either end
/// returns the list unchanged.
///
/// Panics when `index` is out of bounds.
pub fn move_adjacent(exercises: &[Exercise], index: usize, direction: Direction) -> Vec<Exercise> {
    assert!(
        index < exercises.len(),
        "move index {} out of bounds for list of {}",
        index,
        exercises.len()
    );

    let mut next = exercises.to_vec();
    let target = match direction {
        Direction::Up if index == 0 => return next,
        Direction::Up => index - 1,
        Direction::Down if index + 1 >= exercises.len() => return next,
        Direction::Down => index + 1,
    };

    next.swap(index, target);
    next[index].order = index as i32 + 1;
    next[target].order = target as i32 + 1;
    next
}

/// Drag-and-drop move. `to` is an index into the list after `from` has been
/// removed. Every entry is renumbered to its flat position.
///
/// Panics when either index is out of bounds.
pub fn relocate(exercises: &[Exercise], from: usize, to: usize) -> Vec<Exercise> {
    assert!(
        from < exercises.len(),
        "relocate source index {} out of bounds for list of {}",
        from,
        exercises.len()
    );
    assert!(
        to < exercises.len(),
        "relocate destination index {} out of bounds for list of {}",
        to,
        exercises.len()
    );

    let mut next = exercises.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    for (position, exercise) in next.iter_mut().enumerate() {
        exercise.order = position as i32 + 1;
    }
    next
}

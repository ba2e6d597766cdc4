use crate::models::Habit;
use tracing::debug;

/// Resizes a day array to `target` entries, keeping values at overlapping
/// indices and padding with unchecked days. Returns whether anything changed.
pub fn reconcile_days(days: &mut Vec<bool>, target: usize) -> bool {
    if days.len() == target {
        return false;
    }
    days.resize(target, false);
    true
}

/// Reconciles every habit to `target` days and returns how many were resized.
pub fn reconcile_habits(habits: &mut [Habit], target: usize) -> usize {
    let mut resized = 0;
    for habit in habits.iter_mut() {
        let before = habit.days.len();
        if reconcile_days(&mut habit.days, target) {
            debug!(habit = %habit.name, from = before, to = target, "reconciled day array");
            resized += 1;
        }
    }
    resized
}

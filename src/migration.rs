use crate::calendar::Scope;
use crate::models::Habit;
use tracing::{debug, info};

/// How many months back a new month looks for habit definitions.
pub const LOOKBACK_MONTHS: usize = 12;

/// Seeds an empty month from the most recent earlier month with data.
///
/// `lookup` returns the stored habits for a scope, or `None` when that
/// scope has no usable record. The first hit wins; its habits keep their
/// definitions and lose their check-ins. The returned day arrays are empty
/// and must be reconciled to the target month before use.
pub fn seed_from_history<F>(target: Scope, mut lookup: F) -> Vec<Habit>
where
    F: FnMut(Scope) -> Option<Vec<Habit>>,
{
    let mut cursor = target;
    for _ in 0..LOOKBACK_MONTHS {
        cursor = cursor.previous();
        if let Some(previous) = lookup(cursor) {
            info!(
                target_key = %target.storage_key(),
                source_key = %cursor.storage_key(),
                habits = previous.len(),
                "seeding month from earlier habits"
            );
            return previous.iter().map(Habit::carried_forward).collect();
        }
    }

    debug!(target_key = %target.storage_key(), "no earlier month with habits");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HabitKind, Importance};
    use std::collections::HashMap;

    fn scope(year: i32, month: u32) -> Scope {
        Scope::new(year, month).unwrap()
    }

    #[test]
    fn carries_definitions_without_history() {
        let mut read = Habit::new("Read", HabitKind::Positive, 29)
            .with_importance(Importance::High)
            .with_goal(20);
        read.days[3] = true;
        let history = HashMap::from([(scope(2024, 1), vec![read])]);

        let seeded = seed_from_history(scope(2024, 3), |s| history.get(&s).cloned());

        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].name, "Read");
        assert_eq!(seeded[0].importance, Importance::High);
        assert_eq!(seeded[0].goal, 20);
        assert!(seeded[0].days.is_empty());
    }

    #[test]
    fn stops_at_most_recent_month() {
        let history = HashMap::from([
            (scope(2023, 11), vec![Habit::new("Recent", HabitKind::Positive, 31)]),
            (scope(2023, 9), vec![Habit::new("Older", HabitKind::Negative, 31)]),
        ]);

        let seeded = seed_from_history(scope(2024, 1), |s| history.get(&s).cloned());

        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].name, "Recent");
    }

    #[test]
    fn looks_back_at_most_twelve_months() {
        let mut visited = Vec::new();
        let seeded = seed_from_history(scope(2024, 0), |s| {
            visited.push(s);
            None
        });

        assert!(seeded.is_empty());
        assert_eq!(visited.len(), LOOKBACK_MONTHS);
        assert_eq!(visited.first(), Some(&scope(2023, 11)));
        assert_eq!(visited.last(), Some(&scope(2023, 0)));
    }

    #[test]
    fn thirteen_months_back_is_out_of_reach() {
        let history = HashMap::from([(
            scope(2023, 0),
            vec![Habit::new("Ancient", HabitKind::Positive, 31)],
        )]);

        let seeded = seed_from_history(scope(2024, 1), |s| history.get(&s).cloned());

        assert!(seeded.is_empty());
    }
}

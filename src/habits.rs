use crate::calendar::Scope;
use crate::errors::TrackerError;
use crate::migration::seed_from_history;
use crate::models::{DEFAULT_GOAL, DEFAULT_HABIT_NAME, Habit, HabitDraft, HabitKind, Importance};
use crate::reconcile::reconcile_habits;
use crate::storage::KeyValueStore;
use std::ops::Deref;
use tracing::warn;

/// Loads and saves whole habit lists, one record per month.
#[derive(Debug, Clone, Default)]
pub struct HabitStore<S> {
    backend: S,
}

impl<S: KeyValueStore> HabitStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads the habits for `scope`, seeding from earlier months when the
    /// scope has no usable record. Every returned habit has exactly as many
    /// days as the month.
    pub fn load_scope(&self, scope: Scope) -> HabitList {
        let mut habits = match self.read_scope(scope) {
            Some(habits) => habits,
            None => seed_from_history(scope, |earlier| self.read_scope(earlier)),
        };
        reconcile_habits(&mut habits, scope.days_in_month());
        HabitList::new(habits)
    }

    /// Replaces the stored record for `scope` with the full list.
    pub fn save(&mut self, scope: Scope, habits: &[Habit]) -> Result<(), TrackerError> {
        let payload = serde_json::to_string(habits)?;
        self.backend.set(&scope.storage_key(), payload);
        Ok(())
    }

    /// Stored habits for `scope`. Malformed records count as absent.
    fn read_scope(&self, scope: Scope) -> Option<Vec<Habit>> {
        let key = scope.storage_key();
        let raw = self.backend.get(&key)?;
        match serde_json::from_str(raw) {
            Ok(habits) => Some(habits),
            Err(err) => {
                warn!(%key, "ignoring malformed habit record: {err}");
                None
            }
        }
    }
}

/// The ordered habits of the active month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitList {
    habits: Vec<Habit>,
}

impl HabitList {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    pub fn into_vec(self) -> Vec<Habit> {
        self.habits
    }

    pub fn set_day(&mut self, index: usize, day: usize, checked: bool) -> Result<(), TrackerError> {
        let habit = self.habit_mut(index)?;
        let days = habit.days.len();
        let slot = habit
            .days
            .get_mut(day)
            .ok_or(TrackerError::DayOutOfRange { day, days })?;
        *slot = checked;
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), TrackerError> {
        self.habit_mut(index)?.name = name.into();
        Ok(())
    }

    pub fn set_kind(&mut self, index: usize, kind: HabitKind) -> Result<(), TrackerError> {
        self.habit_mut(index)?.kind = kind;
        Ok(())
    }

    pub fn set_importance(
        &mut self,
        index: usize,
        importance: Importance,
    ) -> Result<(), TrackerError> {
        self.habit_mut(index)?.importance = importance;
        Ok(())
    }

    pub fn set_goal(&mut self, index: usize, goal: u32) -> Result<(), TrackerError> {
        if goal == 0 {
            return Err(TrackerError::InvalidGoal);
        }
        self.habit_mut(index)?.goal = goal;
        Ok(())
    }

    /// Moves the habit at `from` so that it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), TrackerError> {
        let len = self.habits.len();
        if from >= len {
            return Err(TrackerError::HabitOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(TrackerError::HabitOutOfRange { index: to, len });
        }
        let habit = self.habits.remove(from);
        self.habits.insert(to, habit);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Habit, TrackerError> {
        let len = self.habits.len();
        if index >= len {
            return Err(TrackerError::HabitOutOfRange { index, len });
        }
        Ok(self.habits.remove(index))
    }

    /// Appends a fresh habit with `days` unchecked days and returns its index.
    pub fn add(&mut self, draft: HabitDraft, days: usize) -> Result<usize, TrackerError> {
        let goal = draft.goal.unwrap_or(DEFAULT_GOAL);
        if goal == 0 {
            return Err(TrackerError::InvalidGoal);
        }
        let habit = Habit::new(
            draft.name.unwrap_or_else(|| DEFAULT_HABIT_NAME.to_string()),
            draft.kind.unwrap_or_default(),
            days,
        )
        .with_importance(draft.importance.unwrap_or_default())
        .with_goal(goal);
        self.habits.push(habit);
        Ok(self.habits.len() - 1)
    }

    fn habit_mut(&mut self, index: usize) -> Result<&mut Habit, TrackerError> {
        let len = self.habits.len();
        self.habits
            .get_mut(index)
            .ok_or(TrackerError::HabitOutOfRange { index, len })
    }
}

impl Deref for HabitList {
    type Target = [Habit];

    fn deref(&self) -> &Self::Target {
        &self.habits
    }
}

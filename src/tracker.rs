//! Application state for the active month.
//!
//! Every mutation runs the same pipeline: validate and mutate the habit list,
//! persist (now, or later for free-text edits), recompute the statistics and
//! notify observers with the fresh snapshot.

use crate::calendar::Scope;
use crate::errors::TrackerError;
use crate::habits::{HabitList, HabitStore};
use crate::models::{Habit, HabitDraft, HabitKind, Importance};
use crate::stats::StatsReport;
use crate::storage::KeyValueStore;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum Edit {
    SetDay { habit: usize, day: usize, checked: bool },
    Rename { habit: usize, name: String },
    SetKind { habit: usize, kind: HabitKind },
    SetImportance { habit: usize, importance: Importance },
    SetGoal { habit: usize, goal: u32 },
    Reorder { from: usize, to: usize },
    Delete { habit: usize, confirmed: bool },
    Add(HabitDraft),
}

/// When an edit reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    Immediate,
    /// Held until typing settles; see [`Tracker::flush_pending`].
    Deferred,
}

impl Edit {
    pub fn persistence(&self) -> Persistence {
        match self {
            Self::Rename { .. } | Self::SetGoal { .. } => Persistence::Deferred,
            _ => Persistence::Immediate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub scope: Scope,
    pub habits: Vec<Habit>,
    pub stats: StatsReport,
    pub pending_save: bool,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub snapshot: Snapshot,
    pub persistence: Persistence,
}

pub type Observer = Box<dyn Fn(&Snapshot) + Send + Sync>;

pub struct Tracker<S> {
    store: HabitStore<S>,
    scope: Scope,
    habits: HabitList,
    dirty: bool,
    clock: Box<dyn Clock>,
    observers: Vec<Observer>,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Opens the month containing the clock's current date.
    pub fn open(backend: S, clock: Box<dyn Clock>) -> Self {
        let scope = Scope::containing(clock.today());
        Self::open_scope(backend, scope, clock)
    }

    pub fn open_scope(backend: S, scope: Scope, clock: Box<dyn Clock>) -> Self {
        let store = HabitStore::new(backend);
        let habits = store.load_scope(scope);
        info!(key = %scope.storage_key(), habits = habits.len(), "opened habit month");
        Self {
            store,
            scope,
            habits,
            dirty: false,
            clock,
            observers: Vec::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn habits(&self) -> &HabitList {
        &self.habits
    }

    pub fn store(&self) -> &HabitStore<S> {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Makes `scope` active. Pending edits for the old month are saved first.
    pub fn switch_scope(&mut self, scope: Scope) -> Result<Snapshot, TrackerError> {
        self.flush_pending()?;
        self.habits = self.store.load_scope(scope);
        self.scope = scope;
        info!(key = %scope.storage_key(), habits = self.habits.len(), "switched habit month");
        Ok(self.refresh())
    }

    pub fn apply(&mut self, edit: Edit) -> Result<Outcome, TrackerError> {
        let persistence = edit.persistence();
        match edit {
            Edit::SetDay {
                habit,
                day,
                checked,
            } => {
                if self.scope.is_future_day(day, self.clock.today()) {
                    return Err(TrackerError::DayLocked { day });
                }
                self.habits.set_day(habit, day, checked)?;
            }
            Edit::Rename { habit, name } => self.habits.rename(habit, name)?,
            Edit::SetKind { habit, kind } => self.habits.set_kind(habit, kind)?,
            Edit::SetImportance { habit, importance } => {
                self.habits.set_importance(habit, importance)?
            }
            Edit::SetGoal { habit, goal } => self.habits.set_goal(habit, goal)?,
            Edit::Reorder { from, to } => self.habits.reorder(from, to)?,
            Edit::Delete { habit, confirmed } => {
                if !confirmed {
                    return Err(TrackerError::ConfirmationRequired);
                }
                let removed = self.habits.remove(habit)?;
                info!(habit = %removed.name, "deleted habit");
            }
            Edit::Add(draft) => {
                self.habits.add(draft, self.scope.days_in_month())?;
            }
        }

        match persistence {
            Persistence::Immediate => self.save()?,
            Persistence::Deferred => self.dirty = true,
        }

        Ok(Outcome {
            snapshot: self.refresh(),
            persistence,
        })
    }

    /// Writes the whole list for the active month.
    pub fn save(&mut self) -> Result<(), TrackerError> {
        self.store.save(self.scope, &self.habits)?;
        self.dirty = false;
        Ok(())
    }

    /// Saves deferred edits, if any. Returns whether a save happened.
    pub fn flush_pending(&mut self) -> Result<bool, TrackerError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            scope: self.scope,
            habits: self.habits.to_vec(),
            stats: StatsReport::compute_at(&self.habits, self.scope, self.clock.today()),
            pending_save: self.dirty,
        }
    }

    /// Recomputes the snapshot and hands it to every observer.
    pub fn refresh(&self) -> Snapshot {
        let snapshot = self.snapshot();
        debug!(
            observers = self.observers.len(),
            completion = snapshot.stats.monthly_completion,
            "recomputed habit stats"
        );
        for observer in &self.observers {
            observer(&snapshot);
        }
        snapshot
    }
}

pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod persist;
pub mod reconcile;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use app::router;
pub use calendar::Scope;
pub use config::AppConfig;
pub use habits::{HabitList, HabitStore};
pub use models::{Habit, HabitKind, Importance};
pub use state::AppState;
pub use stats::StatsReport;
pub use storage::{KeyValueStore, MemoryStore, load_data, persist_data};
pub use tracker::{Edit, Snapshot, SystemClock, Tracker};

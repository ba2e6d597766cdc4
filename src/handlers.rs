use crate::calendar::Scope;
use crate::errors::{AppError, TrackerError};
use crate::models::{DayRequest, DeleteQuery, HabitDraft, HabitPatch, ReorderRequest, ScopeRequest};
use crate::state::AppState;
use crate::stats::StatsReport;
use crate::storage::persist_data;
use crate::tracker::{Edit, Persistence, Snapshot};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::error;

pub async fn get_scope(State(state): State<AppState>) -> Json<Snapshot> {
    let tracker = state.tracker.lock().await;
    Json(tracker.snapshot())
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsReport> {
    let tracker = state.tracker.lock().await;
    Json(tracker.snapshot().stats)
}

pub async fn switch_scope(
    State(state): State<AppState>,
    Json(payload): Json<ScopeRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let scope = Scope::new(payload.year, payload.month)?;
    let mut tracker = state.tracker.lock().await;
    let had_pending = tracker.is_dirty();
    let snapshot = tracker.switch_scope(scope)?;

    if had_pending {
        state.saver.cancel().await;
        persist_data(&state.data_path, tracker.store().backend()).await?;
    }

    Ok(Json(snapshot))
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(draft): Json<HabitDraft>,
) -> Result<Json<Snapshot>, AppError> {
    apply_edits(&state, vec![Edit::Add(draft)]).await
}

pub async fn set_day(
    State(state): State<AppState>,
    Path((habit, day)): Path<(usize, usize)>,
    Json(payload): Json<DayRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let edit = Edit::SetDay {
        habit,
        day,
        checked: payload.checked,
    };
    apply_edits(&state, vec![edit]).await
}

pub async fn patch_habit(
    State(state): State<AppState>,
    Path(habit): Path<usize>,
    Json(patch): Json<HabitPatch>,
) -> Result<Json<Snapshot>, AppError> {
    if patch.goal == Some(0) {
        return Err(TrackerError::InvalidGoal.into());
    }

    let mut edits = Vec::new();
    if let Some(kind) = patch.kind {
        edits.push(Edit::SetKind { habit, kind });
    }
    if let Some(importance) = patch.importance {
        edits.push(Edit::SetImportance { habit, importance });
    }
    if let Some(goal) = patch.goal {
        edits.push(Edit::SetGoal { habit, goal });
    }
    if let Some(name) = patch.name {
        edits.push(Edit::Rename { habit, name });
    }

    apply_edits(&state, edits).await
}

pub async fn reorder(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let edit = Edit::Reorder {
        from: payload.from,
        to: payload.to,
    };
    apply_edits(&state, vec![edit]).await
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(habit): Path<usize>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Snapshot>, AppError> {
    let edit = Edit::Delete {
        habit,
        confirmed: query.confirm,
    };
    apply_edits(&state, vec![edit]).await
}

async fn apply_edits(state: &AppState, edits: Vec<Edit>) -> Result<Json<Snapshot>, AppError> {
    if edits.is_empty() {
        return Err(AppError::bad_request("no changes requested"));
    }

    let mut tracker = state.tracker.lock().await;
    let mut immediate = false;
    for edit in edits {
        immediate |= tracker.apply(edit)?.persistence == Persistence::Immediate;
    }

    if immediate {
        // deferred edits applied after the last save ride along with this write
        tracker.flush_pending()?;
        state.saver.cancel().await;
        persist_data(&state.data_path, tracker.store().backend()).await?;
    } else {
        let later = state.clone();
        state.saver.schedule(flush_deferred(later)).await;
    }

    Ok(Json(tracker.snapshot()))
}

async fn flush_deferred(state: AppState) {
    if let Err(err) = state.flush().await {
        error!("deferred save failed: {}", err.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::HabitStore;
    use crate::models::{Habit, HabitKind};
    use crate::storage::{MemoryStore, load_data};
    use crate::tracker::{FixedClock, Tracker};
    use chrono::NaiveDate;
    use std::path::Path as FsPath;
    use std::time::Duration;
    use tokio::time::sleep;

    fn scope() -> Scope {
        Scope::new(2026, 8).unwrap()
    }

    fn state_at(path: &FsPath) -> AppState {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let tracker = Tracker::open_scope(MemoryStore::new(), scope(), Box::new(FixedClock(today)));
        AppState::new(path.to_path_buf(), tracker, Duration::from_millis(30))
    }

    async fn stored_habits(path: &FsPath) -> Vec<Habit> {
        HabitStore::new(load_data(path).await)
            .load_scope(scope())
            .into_vec()
    }

    #[tokio::test]
    async fn mixed_patch_saves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let state = state_at(&path);
        add_habit(State(state.clone()), Json(HabitDraft::default()))
            .await
            .unwrap();

        let patch = HabitPatch {
            name: Some("Renamed".to_string()),
            kind: Some(HabitKind::Negative),
            goal: Some(9),
            ..HabitPatch::default()
        };
        let Json(snapshot) = patch_habit(State(state.clone()), Path(0), Json(patch))
            .await
            .unwrap();
        assert!(!snapshot.pending_save);

        let stored = stored_habits(&path).await;
        assert_eq!(stored[0].name, "Renamed");
        assert_eq!(stored[0].kind, HabitKind::Negative);
        assert_eq!(stored[0].goal, 9);
        assert!(!state.tracker.lock().await.is_dirty());
    }

    #[tokio::test]
    async fn deferred_rename_reaches_file_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let state = state_at(&path);
        add_habit(State(state.clone()), Json(HabitDraft::default()))
            .await
            .unwrap();

        let patch = HabitPatch {
            name: Some("Evening walk".to_string()),
            ..HabitPatch::default()
        };
        let Json(snapshot) = patch_habit(State(state.clone()), Path(0), Json(patch))
            .await
            .unwrap();
        assert!(snapshot.pending_save);
        assert_eq!(stored_habits(&path).await[0].name, "New Habit");

        sleep(Duration::from_millis(300)).await;
        assert_eq!(stored_habits(&path).await[0].name, "Evening walk");
        assert!(!state.tracker.lock().await.is_dirty());
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_at(&dir.path().join("habits.json"));
        let err = patch_habit(State(state), Path(0), Json(HabitPatch::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("month must be between 0 and 11, got {0}")]
    InvalidMonth(u32),
    #[error("year {0} is outside the supported calendar range")]
    InvalidYear(i32),
    #[error("no habit at index {index} (list has {len})")]
    HabitOutOfRange { index: usize, len: usize },
    #[error("day index {day} is outside the month ({days} days)")]
    DayOutOfRange { day: usize, days: usize },
    #[error("day {} is in the future and cannot be checked yet", .day + 1)]
    DayLocked { day: usize },
    #[error("goal must be a positive number of check-ins")]
    InvalidGoal,
    #[error("importance must be 1, 2 or 3, got {0}")]
    InvalidImportance(u8),
    #[error("deleting a habit requires confirmation")]
    ConfirmationRequired,
    #[error("failed to serialize habits: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        let status = match &err {
            TrackerError::HabitOutOfRange { .. } | TrackerError::DayOutOfRange { .. } => {
                StatusCode::NOT_FOUND
            }
            TrackerError::ConfirmationRequired => StatusCode::CONFLICT,
            TrackerError::DayLocked { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TrackerError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TrackerError::InvalidMonth(_)
            | TrackerError::InvalidYear(_)
            | TrackerError::InvalidGoal
            | TrackerError::InvalidImportance(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_errors_map_to_statuses() {
        let missing = AppError::from(TrackerError::HabitOutOfRange { index: 4, len: 2 });
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let unconfirmed = AppError::from(TrackerError::ConfirmationRequired);
        assert_eq!(unconfirmed.status, StatusCode::CONFLICT);

        let locked = AppError::from(TrackerError::DayLocked { day: 20 });
        assert_eq!(locked.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(locked.message.contains("day 21"));

        let invalid = AppError::from(TrackerError::InvalidGoal);
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }
}

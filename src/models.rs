use crate::errors::TrackerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GOAL: u32 = 28;
pub const DEFAULT_HABIT_NAME: &str = "New Habit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    #[default]
    Positive,
    Negative,
}

impl HabitKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn is_success(self, checked: bool) -> bool {
        match self {
            Self::Positive => checked,
            Self::Negative => !checked,
        }
    }

    /// Contribution of a checked day to the daily net score.
    pub fn net_value(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }
}

/// Weight of a habit in aggregate scores. Stored as the integer 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Importance {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl Importance {
    pub fn weight(self) -> f64 {
        f64::from(u8::from(self))
    }
}

impl From<Importance> for u8 {
    fn from(value: Importance) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for Importance {
    type Error = TrackerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(TrackerError::InvalidImportance(other)),
        }
    }
}

/// Loads through `HabitRecord`, so missing or invalid fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HabitRecord")]
pub struct Habit {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    #[serde(rename = "weight")]
    pub importance: Importance,
    pub goal: u32,
    pub days: Vec<bool>,
}

impl Habit {
    pub fn new(name: impl Into<String>, kind: HabitKind, days: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            importance: Importance::default(),
            goal: DEFAULT_GOAL,
            days: vec![false; days],
        }
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_goal(mut self, goal: u32) -> Self {
        self.goal = goal;
        self
    }

    pub fn carried_forward(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            importance: self.importance,
            goal: self.goal,
            days: Vec::new(),
        }
    }

    pub fn checked_count(&self) -> usize {
        self.days.iter().filter(|checked| **checked).count()
    }

    pub fn is_checked(&self, day: usize) -> bool {
        self.days.get(day).copied().unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct HabitRecord {
    #[serde(default)]
    name: Value,
    #[serde(rename = "type", default)]
    kind: Value,
    #[serde(default)]
    weight: Value,
    #[serde(default)]
    goal: Value,
    #[serde(default)]
    days: Value,
}

impl From<HabitRecord> for Habit {
    fn from(record: HabitRecord) -> Self {
        let name = match record.name {
            Value::String(name) => name,
            _ => String::new(),
        };
        let kind = record
            .kind
            .as_str()
            .and_then(HabitKind::parse)
            .unwrap_or_default();
        let importance = record
            .weight
            .as_u64()
            .and_then(|weight| u8::try_from(weight).ok())
            .and_then(|weight| Importance::try_from(weight).ok())
            .unwrap_or_default();
        let goal = record
            .goal
            .as_u64()
            .and_then(|goal| u32::try_from(goal).ok())
            .filter(|goal| *goal > 0)
            .unwrap_or(DEFAULT_GOAL);
        let days = match record.days {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_bool().unwrap_or(false))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            name,
            kind,
            importance,
            goal,
            days,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<HabitKind>,
    #[serde(rename = "weight", default)]
    pub importance: Option<Importance>,
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ScopeRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct DayRequest {
    pub checked: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HabitPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<HabitKind>,
    #[serde(rename = "weight", default)]
    pub importance: Option<Importance>,
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

use crate::calendar::Scope;
use crate::models::{Habit, HabitKind};
use chrono::NaiveDate;
use serde::Serialize;

/// Recency weights for the last four days, oldest first.
pub const MOMENTUM_WEIGHTS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];
pub const HEATMAP_DAYS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatTier {
    Empty,
    /// Net score of zero or below.
    Inactive,
    Low,
    Medium,
    High,
}

impl HeatTier {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity < 0.4 {
            Self::Low
        } else if intensity < 0.8 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    /// 1-based day of month, `None` for cells before the month starts.
    pub day: Option<u32>,
    pub net_score: i32,
    pub intensity: f64,
    pub tier: HeatTier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayTally {
    pub done: usize,
    pub positive_total: usize,
    pub slips: usize,
    pub negative_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityPoint {
    pub day: u32,
    pub score: i32,
    pub positive: u32,
    pub negative: u32,
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitProgress {
    pub name: String,
    pub kind: HabitKind,
    pub completion: f64,
    pub checked: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub scope: Scope,
    pub today_index: Option<usize>,
    pub monthly_completion: f64,
    pub efficiency: f64,
    pub today_performance: f64,
    pub momentum: f64,
    pub net_today: i32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub today: TodayTally,
    pub heatmap: Vec<HeatCell>,
    pub activity: Vec<ActivityPoint>,
    pub habits: Vec<HabitProgress>,
}

impl StatsReport {
    /// Builds every metric for `scope` as seen on `today`. Future months have
    /// no elapsed days, so every "so far" metric is zero for them.
    pub fn compute_at(habits: &[Habit], scope: Scope, today: NaiveDate) -> Self {
        let total_days = scope.days_in_month();
        let today_index = scope.elapsed_index(today);

        let mut report = Self {
            scope,
            today_index,
            monthly_completion: monthly_completion(habits),
            efficiency: 0.0,
            today_performance: 0.0,
            momentum: 0.0,
            net_today: 0,
            current_streak: 0,
            best_streak: 0,
            today: TodayTally {
                positive_total: count_kind(habits, HabitKind::Positive),
                negative_total: count_kind(habits, HabitKind::Negative),
                ..TodayTally::default()
            },
            heatmap: inactive_heatmap(),
            activity: activity(habits, total_days, today_index),
            habits: habits.iter().map(progress).collect(),
        };

        if let Some(index) = today_index {
            report.efficiency = efficiency(habits, index);
            report.today_performance = today_performance(habits, index);
            report.momentum = momentum(habits, index);
            report.net_today = net_score(habits, index);
            report.current_streak = current_streak(habits, index);
            report.best_streak = best_streak(habits, index);
            report.today = today_tally(habits, index);
            report.heatmap = heatmap(habits, index, total_days);
        }

        report
    }
}

/// Share of the month's target reached, capped at 1.
pub fn month_ratio(habit: &Habit) -> f64 {
    let checked = habit.checked_count() as f64;
    match habit.kind {
        HabitKind::Positive => (checked / f64::from(habit.goal.max(1))).min(1.0),
        HabitKind::Negative => {
            let total = habit.days.len();
            if total == 0 {
                0.0
            } else {
                (total as f64 - checked) / total as f64
            }
        }
    }
}

pub fn elapsed_ratio(habit: &Habit, today_idx: usize) -> f64 {
    let days_passed = today_idx + 1;
    let checked = habit
        .days
        .iter()
        .take(days_passed)
        .filter(|checked| **checked)
        .count() as f64;
    let ratio = match habit.kind {
        HabitKind::Positive => checked / days_passed as f64,
        HabitKind::Negative => (days_passed as f64 - checked) / days_passed as f64,
    };
    ratio.max(0.0)
}

/// Recency-weighted success over the four days ending at `today_idx`,
/// normalized by the weights of the days that exist.
pub fn habit_momentum(habit: &Habit, today_idx: usize) -> f64 {
    let mut success: f64 = 0.0;
    let mut weight_sum: f64 = 0.0;
    for (offset, &weight) in MOMENTUM_WEIGHTS.iter().enumerate() {
        let back = MOMENTUM_WEIGHTS.len() - 1 - offset;
        let Some(day) = today_idx.checked_sub(back) else {
            continue;
        };
        let Some(checked) = habit.days.get(day) else {
            continue;
        };
        weight_sum += weight;
        if habit.kind.is_success(*checked) {
            success += weight;
        }
    }
    if weight_sum > 0.0 {
        success / weight_sum
    } else {
        0.0
    }
}

/// Importance-weighted mean of `ratio` across habits, as a percentage.
fn weighted_percent(habits: &[Habit], ratio: impl Fn(&Habit) -> f64) -> f64 {
    let (earned, possible) = habits.iter().fold((0.0_f64, 0.0_f64), |(earned, possible), habit| {
        let weight = habit.importance.weight();
        (earned + ratio(habit) * weight, possible + weight)
    });
    if possible > 0.0 {
        earned / possible * 100.0
    } else {
        0.0
    }
}

pub fn monthly_completion(habits: &[Habit]) -> f64 {
    weighted_percent(habits, month_ratio)
}

pub fn efficiency(habits: &[Habit], today_idx: usize) -> f64 {
    weighted_percent(habits, |habit| elapsed_ratio(habit, today_idx))
}

pub fn momentum(habits: &[Habit], today_idx: usize) -> f64 {
    weighted_percent(habits, |habit| habit_momentum(habit, today_idx))
}

pub fn today_tally(habits: &[Habit], today_idx: usize) -> TodayTally {
    let mut tally = TodayTally::default();
    for habit in habits {
        let checked = habit.is_checked(today_idx);
        match habit.kind {
            HabitKind::Positive => {
                tally.positive_total += 1;
                tally.done += usize::from(checked);
            }
            HabitKind::Negative => {
                tally.negative_total += 1;
                tally.slips += usize::from(checked);
            }
        }
    }
    tally
}

/// Unweighted share of habits on track for `today_idx`, as a percentage.
pub fn today_performance(habits: &[Habit], today_idx: usize) -> f64 {
    let tally = today_tally(habits, today_idx);
    let succeeded = tally.done + (tally.negative_total - tally.slips);
    let total = (tally.positive_total + tally.negative_total).max(1);
    succeeded as f64 / total as f64 * 100.0
}

pub fn net_score(habits: &[Habit], day: usize) -> i32 {
    habits
        .iter()
        .filter(|habit| habit.is_checked(day))
        .map(|habit| habit.kind.net_value())
        .sum()
}

/// Consecutive positive net-score days counting back from `today_idx`.
/// A neutral `today_idx` is skipped. Any other non-positive day ends the run.
pub fn current_streak(habits: &[Habit], today_idx: usize) -> u32 {
    let mut streak = 0;
    for day in (0..=today_idx).rev() {
        let score = net_score(habits, day);
        if score > 0 {
            streak += 1;
        } else if day == today_idx && score == 0 {
            continue;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of positive net-score days within `0..=today_idx`.
pub fn best_streak(habits: &[Habit], today_idx: usize) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for day in 0..=today_idx {
        if net_score(habits, day) > 0 {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// The [`HEATMAP_DAYS`] days ending at `today_idx`, oldest first.
pub fn heatmap(habits: &[Habit], today_idx: usize, total_days: usize) -> Vec<HeatCell> {
    let max_possible = habits.len().max(1) as f64;
    (0..HEATMAP_DAYS)
        .map(|position| {
            let back = HEATMAP_DAYS - 1 - position;
            let day = today_idx.checked_sub(back).filter(|day| *day < total_days);
            let Some(day) = day else {
                return HeatCell {
                    day: None,
                    net_score: 0,
                    intensity: 0.0,
                    tier: HeatTier::Empty,
                };
            };
            let score = net_score(habits, day);
            let (intensity, tier) = if score > 0 {
                let intensity = f64::from(score) / max_possible;
                (intensity, HeatTier::from_intensity(intensity))
            } else {
                (0.0, HeatTier::Inactive)
            };
            HeatCell {
                day: Some(day as u32 + 1),
                net_score: score,
                intensity,
                tier,
            }
        })
        .collect()
}

fn inactive_heatmap() -> Vec<HeatCell> {
    vec![
        HeatCell {
            day: None,
            net_score: 0,
            intensity: 0.0,
            tier: HeatTier::Inactive,
        };
        HEATMAP_DAYS
    ]
}

pub fn activity(
    habits: &[Habit],
    total_days: usize,
    marked_through: Option<usize>,
) -> Vec<ActivityPoint> {
    (0..total_days)
        .map(|day| {
            let mut positive = 0;
            let mut negative = 0;
            for habit in habits.iter().filter(|habit| habit.is_checked(day)) {
                match habit.kind {
                    HabitKind::Positive => positive += 1,
                    HabitKind::Negative => negative += 1,
                }
            }
            ActivityPoint {
                day: day as u32 + 1,
                score: positive as i32 - negative as i32,
                positive,
                negative,
                marked: marked_through.is_some_and(|last| day <= last),
            }
        })
        .collect()
}

pub fn progress(habit: &Habit) -> HabitProgress {
    HabitProgress {
        name: habit.name.clone(),
        kind: habit.kind,
        completion: month_ratio(habit) * 100.0,
        checked: habit.checked_count(),
    }
}

fn count_kind(habits: &[Habit], kind: HabitKind) -> usize {
    habits.iter().filter(|habit| habit.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Importance;

    fn positive(days: usize, checked: &[usize]) -> Habit {
        with_checks(Habit::new("Exercise", HabitKind::Positive, days), checked)
    }

    fn negative(days: usize, checked: &[usize]) -> Habit {
        with_checks(Habit::new("Smoked", HabitKind::Negative, days), checked)
    }

    fn with_checks(mut habit: Habit, checked: &[usize]) -> Habit {
        for day in checked {
            habit.days[*day] = true;
        }
        habit
    }

    fn approx(left: f64, right: f64) {
        assert!((left - right).abs() < 1e-9, "{left} != {right}");
    }

    #[test]
    fn positive_completion_is_capped() {
        let habit = positive(30, &(0..12).collect::<Vec<_>>()).with_goal(10);
        approx(monthly_completion(&[habit]), 100.0);
    }

    #[test]
    fn negative_completion_counts_clean_days() {
        let habit = negative(30, &[1, 5, 9, 20, 29]);
        let pct = monthly_completion(&[habit]);
        approx(pct, 25.0 / 30.0 * 100.0);
        assert_eq!(pct.round(), 83.0);
    }

    #[test]
    fn completion_is_weighted_by_importance() {
        let high = positive(30, &(0..10).collect::<Vec<_>>())
            .with_goal(10)
            .with_importance(Importance::High);
        let low = positive(30, &[]).with_importance(Importance::Low);
        approx(monthly_completion(&[high, low]), 75.0);
    }

    #[test]
    fn equal_importance_reduces_to_plain_average() {
        let a = positive(30, &[0, 1, 2, 3]);
        let b = negative(30, &[0, 1]);
        let c = positive(30, &[3]);
        let today = 3;
        let plain = (elapsed_ratio(&a, today) + elapsed_ratio(&b, today) + elapsed_ratio(&c, today))
            / 3.0
            * 100.0;
        approx(efficiency(&[a.clone(), b.clone(), c.clone()], today), plain);

        let plain_momentum = (habit_momentum(&a, today)
            + habit_momentum(&b, today)
            + habit_momentum(&c, today))
            / 3.0
            * 100.0;
        approx(momentum(&[a, b, c], today), plain_momentum);
    }

    #[test]
    fn empty_lists_score_zero() {
        assert_eq!(monthly_completion(&[]), 0.0);
        assert_eq!(efficiency(&[], 5), 0.0);
        assert_eq!(momentum(&[], 5), 0.0);
        assert_eq!(today_performance(&[], 5), 0.0);
        assert_eq!(current_streak(&[], 5), 0);
    }

    #[test]
    fn efficiency_uses_elapsed_days() {
        let habit = positive(30, &[0, 2, 10]);
        approx(efficiency(&[habit.clone()], 3), 50.0);
        let slips = negative(30, &[0]);
        approx(efficiency(&[slips], 3), 75.0);
    }

    #[test]
    fn today_performance_mixes_kinds() {
        let habits = vec![
            positive(30, &[4]),
            positive(30, &[]),
            negative(30, &[4]),
            negative(30, &[]),
        ];
        approx(today_performance(&habits, 4), 50.0);
        let tally = today_tally(&habits, 4);
        assert_eq!(
            tally,
            TodayTally {
                done: 1,
                positive_total: 2,
                slips: 1,
                negative_total: 2,
            }
        );
    }

    #[test]
    fn momentum_normalizes_early_in_month() {
        let habit = positive(30, &[1]);
        approx(habit_momentum(&habit, 1), 0.4 / 0.7);
        approx(habit_momentum(&habit, 0), 0.0);
    }

    #[test]
    fn momentum_weights_recent_days() {
        let habit = positive(30, &[7, 9]);
        approx(habit_momentum(&habit, 9), 0.2 + 0.4);
        let slips = negative(30, &[9]);
        approx(habit_momentum(&slips, 9), 0.6);
    }

    #[test]
    fn net_score_counts_slips_against() {
        let habits = vec![positive(30, &[2]), positive(30, &[2]), negative(30, &[2])];
        assert_eq!(net_score(&habits, 2), 1);
        assert_eq!(net_score(&habits, 3), 0);
    }

    #[test]
    fn neutral_today_keeps_streak() {
        let habits = vec![positive(30, &[0, 1, 2])];
        assert_eq!(current_streak(&habits, 3), 3);
    }

    #[test]
    fn negative_today_breaks_streak() {
        let habits = vec![positive(30, &[0, 1, 2]), negative(30, &[3])];
        assert_eq!(current_streak(&habits, 3), 0);
    }

    #[test]
    fn neutral_earlier_day_ends_streak() {
        let habits = vec![positive(30, &[0, 2, 3])];
        assert_eq!(current_streak(&habits, 3), 2);
        assert_eq!(best_streak(&habits, 3), 2);
    }

    #[test]
    fn best_streak_finds_longest_run() {
        let habits = vec![positive(30, &[0, 1, 2, 3, 6, 7])];
        assert_eq!(best_streak(&habits, 9), 4);
        assert_eq!(current_streak(&habits, 9), 0);
    }

    #[test]
    fn heatmap_tiers_by_intensity() {
        let habits = vec![
            positive(30, &[13, 14, 15]),
            positive(30, &[14, 15]),
            positive(30, &[15]),
            negative(30, &[12]),
            negative(30, &[]),
        ];
        let cells = heatmap(&habits, 15, 30);
        assert_eq!(cells.len(), HEATMAP_DAYS);
        assert_eq!(cells[0].day, Some(3));
        let last = &cells[13];
        assert_eq!(last.day, Some(16));
        assert_eq!(last.net_score, 3);
        assert_eq!(last.tier, HeatTier::Medium);
        assert_eq!(cells[12].tier, HeatTier::Medium);
        assert_eq!(cells[11].tier, HeatTier::Low);
        assert_eq!(cells[10].tier, HeatTier::Inactive);
        assert_eq!(cells[9].tier, HeatTier::Inactive);
    }

    #[test]
    fn heatmap_marks_days_before_month_empty() {
        let habits = vec![positive(30, &[0, 1, 2])];
        let cells = heatmap(&habits, 2, 30);
        assert!(cells[..11].iter().all(|cell| cell.tier == HeatTier::Empty));
        assert!(cells[11..].iter().all(|cell| cell.tier == HeatTier::High));
    }

    #[test]
    fn heatmap_never_lights_non_positive_days() {
        let habits = vec![positive(30, &[5]), negative(30, &[5])];
        let cells = heatmap(&habits, 5, 30);
        assert_eq!(cells[13].net_score, 0);
        assert_eq!(cells[13].tier, HeatTier::Inactive);
    }

    #[test]
    fn activity_marks_through_reference_day() {
        let habits = vec![positive(5, &[0, 1]), negative(5, &[1])];
        let points = activity(&habits, 5, Some(2));
        assert_eq!(points.len(), 5);
        assert_eq!(points[1].score, 0);
        assert_eq!(points[1].positive, 1);
        assert_eq!(points[1].negative, 1);
        assert!(points[2].marked);
        assert!(!points[3].marked);
    }

    #[test]
    fn report_for_past_month_pins_to_last_day() {
        let scope = Scope::new(2024, 3).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let habits = vec![positive(30, &[27, 28, 29])];

        let report = StatsReport::compute_at(&habits, scope, today);

        assert_eq!(report.today_index, Some(29));
        assert_eq!(report.net_today, 1);
        assert_eq!(report.current_streak, 3);
        assert_eq!(report.today.done, 1);
        assert_eq!(report.habits[0].checked, 3);
        assert!(report.activity.iter().all(|point| point.marked));
    }

    #[test]
    fn report_for_future_month_has_no_elapsed_metrics() {
        let scope = Scope::new(2027, 0).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let habits = vec![negative(31, &[])];

        let report = StatsReport::compute_at(&habits, scope, today);

        assert_eq!(report.today_index, None);
        approx(report.monthly_completion, 100.0);
        assert_eq!(report.efficiency, 0.0);
        assert_eq!(report.today_performance, 0.0);
        assert_eq!(report.momentum, 0.0);
        assert_eq!(report.today.negative_total, 1);
        assert!(report.heatmap.iter().all(|cell| cell.tier == HeatTier::Inactive));
        assert!(report.activity.iter().all(|point| !point.marked));
    }
}

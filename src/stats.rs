use crate::models::{Action, ActionStats};
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Number of actions per month that counts as 100% progress.
pub const MONTHLY_GOAL: usize = 20;

pub fn build_stats(actions: &[Action]) -> ActionStats {
    build_stats_at(Local::now().date_naive(), actions)
}

pub fn build_stats_at(today: NaiveDate, actions: &[Action]) -> ActionStats {
    let week_floor = today - Duration::days(7);

    let mut total_points = 0u64;
    let mut this_week_actions = 0usize;
    let mut this_month_actions = 0usize;
    let mut this_month_points = 0u64;

    for action in actions {
        let points = u64::from(action.points);
        total_points = total_points.saturating_add(points);

        if action.date >= week_floor {
            this_week_actions += 1;
        }
        if same_month(action.date, today) {
            this_month_actions += 1;
            this_month_points = this_month_points.saturating_add(points);
        }
    }

    let total_actions = actions.len();
    ActionStats {
        total_actions,
        total_points,
        average_points: rounded_ratio(total_points, total_actions as u64),
        this_week_actions,
        this_month_actions,
        this_month_points,
        monthly_progress_percent: progress_percent(this_month_actions),
    }
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

/// `round(numerator / denominator)` with halves rounded up; 0 for an empty denominator.
fn rounded_ratio(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator.saturating_mul(2) + denominator) / (denominator * 2)
}

fn progress_percent(month_actions: usize) -> u8 {
    let percent = rounded_ratio(month_actions as u64 * 100, MONTHLY_GOAL as u64).min(100);
    percent as u8
}

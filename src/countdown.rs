use chrono::TimeZone;

use crate::models::{CountdownStatus, HistoryEntry, ReminderState, TimeParts, Timestamp};

/// When the chore is next due: one period after the last acknowledgement, or
/// right now if nothing has ever been acknowledged.
pub fn target_timestamp(state: &ReminderState, now: Timestamp, period_ms: i64) -> Timestamp {
    match state.last_completed_at() {
        Some(last) => last + period_ms,
        None => now,
    }
}

pub fn status(state: &ReminderState, now: Timestamp, period_ms: i64) -> CountdownStatus {
    let target_at = target_timestamp(state, now, period_ms);
    CountdownStatus {
        target_at,
        is_overdue: target_at < now,
        parts: decompose((now - target_at).abs()),
    }
}

fn decompose(duration_ms: i64) -> TimeParts {
    let total_seconds = duration_ms / 1000;
    TimeParts {
        days: total_seconds / 86_400,
        hours: (total_seconds % 86_400) / 3_600,
        minutes: (total_seconds % 3_600) / 60,
        seconds: total_seconds % 60,
    }
}

/// Formats an acknowledgement timestamp for the history list, e.g.
/// "Jan 5 2024, 3:04 pm". Generic over the zone so tests can pin one.
pub fn format_completed_at<Tz: TimeZone>(ts: Timestamp, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.format("%b %-d %Y, %-I:%M %P").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// History rows in stored (reverse-chronological) order.
pub fn history_entries<Tz: TimeZone>(state: &ReminderState, tz: &Tz) -> Vec<HistoryEntry>
where
    Tz::Offset: std::fmt::Display,
{
    state
        .completed_at_timestamps
        .iter()
        .map(|&completed_at| HistoryEntry {
            completed_at,
            label: format_completed_at(completed_at, tz),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const PERIOD: i64 = 24 * 60 * 60 * 1000;

    fn with_history(timestamps: Vec<Timestamp>) -> ReminderState {
        ReminderState {
            current_notification_id: None,
            completed_at_timestamps: timestamps,
        }
    }

    #[test]
    fn empty_history_targets_now_with_zeroed_parts() {
        let now = 1_700_000_000_000;
        let status = status(&with_history(Vec::new()), now, PERIOD);
        assert_eq!(status.target_at, now);
        assert!(!status.is_overdue);
        assert_eq!(status.parts, TimeParts::default());
    }

    #[test]
    fn target_is_one_period_after_most_recent_entry() {
        let state = with_history(vec![5_000, 1_000]);
        assert_eq!(target_timestamp(&state, 0, PERIOD), 5_000 + PERIOD);
    }

    #[test]
    fn remaining_time_decomposes_into_days_hours_minutes_seconds() {
        let last = 1_000_000;
        let state = with_history(vec![last]);
        // 1 day, 2 hours, 3 minutes and 4 seconds before the target.
        let offset = ((24 + 2) * 3_600 + 3 * 60 + 4) * 1_000;
        let now = last + PERIOD - offset;

        let status = status(&state, now, PERIOD);
        assert!(!status.is_overdue);
        assert_eq!(
            status.parts,
            TimeParts {
                days: 1,
                hours: 2,
                minutes: 3,
                seconds: 4,
            }
        );
    }

    #[test]
    fn overdue_is_strict_and_magnitude_stays_non_negative() {
        let last = 1_000_000;
        let state = with_history(vec![last]);
        let target = last + PERIOD;

        // Exactly at the target: not overdue yet.
        let at_target = status(&state, target, PERIOD);
        assert!(!at_target.is_overdue);
        assert_eq!(at_target.parts, TimeParts::default());

        // One second past: overdue, with the elapsed magnitude.
        let past = status(&state, target + 1_000, PERIOD);
        assert!(past.is_overdue);
        assert_eq!(
            past.parts,
            TimeParts {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 1,
            }
        );
    }

    #[test]
    fn sub_second_distances_round_down_to_zero() {
        let state = with_history(vec![10_000]);
        let status = status(&state, 10_000 + PERIOD - 999, PERIOD);
        assert_eq!(status.parts, TimeParts::default());
    }

    #[test]
    fn format_uses_short_month_and_lowercase_meridiem() {
        // 2024-01-05 20:04:05 UTC is 3:04 pm in New York (EST, UTC-5).
        let ts = 1_704_485_045_000;
        assert_eq!(
            format_completed_at(ts, &chrono_tz::America::New_York),
            "Jan 5 2024, 3:04 pm"
        );
        assert_eq!(
            format_completed_at(ts, &Utc),
            "Jan 5 2024, 8:04 pm"
        );
        // Next day in Tokyo (UTC+9).
        assert_eq!(
            format_completed_at(ts, &chrono_tz::Asia::Tokyo),
            "Jan 6 2024, 5:04 am"
        );
    }

    #[test]
    fn format_falls_back_to_raw_millis_when_out_of_range() {
        assert_eq!(format_completed_at(i64::MAX, &Utc), i64::MAX.to_string());
    }

    #[test]
    fn history_entries_preserve_stored_order() {
        let state = with_history(vec![1_704_485_045_000, 1_704_398_645_000]);
        let entries = history_entries(&state, &Utc);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].completed_at, 1_704_485_045_000);
        assert_eq!(entries[0].label, "Jan 5 2024, 8:04 pm");
        assert_eq!(entries[1].completed_at, 1_704_398_645_000);
        assert_eq!(entries[1].label, "Jan 4 2024, 8:04 pm");

        assert!(history_entries(&with_history(Vec::new()), &Utc).is_empty());
    }
}

//! Relative date labels for conversation lists.

use chrono::{DateTime, Utc};

/// Label `then` relative to `now`: "Today", "Yesterday", "N days ago",
/// "N weeks ago", or a short month-day date after four weeks.
///
/// Days are whole 24-hour periods, so something from late yesterday evening
/// can still be "Today". Instants in the future count as today.
#[must_use]
pub fn relative_date(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days();

    match days {
        i64::MIN..=0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days / 7),
        _ => then.format("%b %-d").to_string(),
    }
}

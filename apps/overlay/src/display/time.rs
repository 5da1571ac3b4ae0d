//! Clock text for timer and card displays.

use serde::{Deserialize, Serialize};

/// How milliseconds are reduced to whole seconds before formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// A countdown shows "00:01" until the last millisecond is gone.
    #[default]
    Ceil,
    Floor,
    /// Half-seconds round toward positive infinity.
    Round,
}

impl RoundingMode {
    pub fn to_seconds(self, milliseconds: i64) -> i64 {
        match self {
            RoundingMode::Ceil => -(-milliseconds).div_euclid(1000),
            RoundingMode::Floor => milliseconds.div_euclid(1000),
            RoundingMode::Round => (milliseconds + 500).div_euclid(1000),
        }
    }
}

/// Formats milliseconds as `HH:MM:SS` or `MM:SS`, rounding up to whole seconds.
pub fn format_time(milliseconds: i64, show_hours: bool) -> String {
    format_time_with(milliseconds, show_hours, RoundingMode::Ceil)
}

/// Formats milliseconds as `[-]HH:MM:SS` or `[-]MM:SS`.
///
/// The sign applies to the whole value; every field is the zero-padded
/// component of the absolute second count. With hours hidden the hour
/// component is dropped, not folded into the minutes.
pub fn format_time_with(milliseconds: i64, show_hours: bool, rounding: RoundingMode) -> String {
    let total_seconds = rounding.to_seconds(milliseconds);
    let sign = if total_seconds < 0 { "-" } else { "" };
    let abs_seconds = total_seconds.unsigned_abs();

    let hours = abs_seconds / 3600;
    let minutes = (abs_seconds % 3600) / 60;
    let seconds = abs_seconds % 60;

    if show_hours {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}")
    }
}

/// Formats a time-of-day offset (ms since midnight) as `HH:MM` for cards.
/// Negative offsets clamp to `00:00`.
pub fn format_event_time(milliseconds: i64) -> String {
    let total_seconds = RoundingMode::Ceil.to_seconds(milliseconds).max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{hours:02}:{minutes:02}")
}

/// Text shown while no timer value has arrived yet.
pub fn timer_placeholder(show_hours: bool) -> &'static str {
    if show_hours {
        "--:--:--"
    } else {
        "--:--"
    }
}

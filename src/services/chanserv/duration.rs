//! Human-readable ban durations: `30m`, `1h`, `2d12h`, `1week`.

use chrono::Duration;

/// Ban length when none is given.
pub const DEFAULT_BAN_DURATION: Duration = Duration::hours(1);

/// Parse one or more `<number><unit>` groups into a duration.
///
/// Returns `None` for anything else, including bare numbers and zero.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: i64 = 0;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: i64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = unit_seconds(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        total = total.checked_add(amount.checked_mul(unit)?)?;
    }

    if total == 0 {
        return None;
    }
    Duration::try_seconds(total)
}

fn unit_seconds(unit: &str) -> Option<i64> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "wk" | "week" | "weeks" => 604_800,
        _ => return None,
    };
    Some(seconds)
}

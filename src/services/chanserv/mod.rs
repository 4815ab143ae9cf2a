//! ChanServ - channel registration and moderation service.
//!
//! Every command runs behind its own boundary: failures become a
//! [`CommandResponse`] carrying an apology and the reason, never an error
//! returned to the caller.

mod commands;
mod duration;

pub use commands::{ChanServ, CommandResponse, HelpEntry, RegisterRequest, RemoveRequest};
pub use duration::{DEFAULT_BAN_DURATION, parse_duration};

/// Render a Unix timestamp for chat output.
pub fn format_timestamp(ts: i64) -> String {
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(1_533_427_200), "2018-08-05 00:00:00 UTC");
    }

    #[test]
    fn out_of_range_falls_back_to_raw() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}

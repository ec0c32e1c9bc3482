use chrono::{Local, NaiveDateTime, SubsecRound};

/// On-disk timestamp format for every table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local wall-clock time, truncated to whole seconds so that it
/// survives a round trip through [`TIMESTAMP_FORMAT`].
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Render a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Blank or malformed values yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

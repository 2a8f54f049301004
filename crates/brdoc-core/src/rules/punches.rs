//! Timecard punch filtering.
//!
//! Timecard rows print the scheduled shift before the actual clock-ins, so a
//! line like `08:00 12:00 13:00 17:00 07:54 12:10 13:05 18:02` holds four
//! planned times followed by four real punches. The filter drops the scheduled
//! prefix and keeps the strictly increasing sequence of what remains.

use tracing::trace;

/// Most punches a day row carries (two entries, two exits).
pub const MAX_PUNCHES: usize = 4;

/// Minutes since midnight for an `HH:MM` string. Invalid times yield `None`.
pub fn minutes_since_midnight(time: &str) -> Option<u32> {
    let (hours, minutes) = time.trim().split_once(':')?;
    if hours.is_empty() || minutes.len() != 2 {
        return None;
    }

    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Normalize `H:MM` and `HH:MM:SS` into `HH:MM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let candidate = format!("{:0>2}:{}", hours, minutes);
    minutes_since_midnight(&candidate).map(|_| candidate)
}

/// Filters candidate times of one day row into real punches.
#[derive(Debug, Clone, Copy)]
pub struct PunchFilter {
    scheduled_prefix: usize,
    limit: usize,
}

impl PunchFilter {
    /// A filter with no scheduled prefix.
    pub fn new() -> Self {
        Self {
            scheduled_prefix: 0,
            limit: MAX_PUNCHES,
        }
    }

    /// Number of leading scheduled times printed before the punches.
    pub fn with_scheduled_prefix(mut self, prefix: usize) -> Self {
        self.scheduled_prefix = prefix;
        self
    }

    /// Maximum punches kept.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn scheduled_prefix(&self) -> usize {
        self.scheduled_prefix
    }

    /// Apply the filter.
    ///
    /// The prefix is skipped only when the row has more candidates than the
    /// prefix; otherwise the whole row is treated as punches. Invalid and
    /// non-increasing times are discarded.
    pub fn filter<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        let window = if candidates.len() > self.scheduled_prefix {
            &candidates[self.scheduled_prefix..]
        } else {
            candidates
        };

        let mut punches = Vec::with_capacity(self.limit);
        let mut last: Option<u32> = None;

        for candidate in window {
            if punches.len() >= self.limit {
                break;
            }

            let time = candidate.as_ref();
            let Some(minutes) = minutes_since_midnight(time) else {
                trace!("Discarding invalid time {}", time);
                continue;
            };

            if last.is_some_and(|previous| minutes <= previous) {
                trace!("Discarding non-increasing time {}", time);
                continue;
            }

            punches.push(time.trim().to_string());
            last = Some(minutes);
        }

        punches
    }
}

impl Default for PunchFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight("00:00"), Some(0));
        assert_eq!(minutes_since_midnight("07:54"), Some(474));
        assert_eq!(minutes_since_midnight("23:59"), Some(1439));
        assert_eq!(minutes_since_midnight("24:00"), None);
        assert_eq!(minutes_since_midnight("12:60"), None);
        assert_eq!(minutes_since_midnight("1200"), None);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("7:05").as_deref(), Some("07:05"));
        assert_eq!(normalize_time("07:05:33").as_deref(), Some("07:05"));
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_time("x"), None);
    }

    #[test]
    fn test_scheduled_prefix_is_skipped() {
        let row = [
            "08:00", "12:00", "13:00", "17:00", "07:54", "12:10", "13:05", "18:02",
        ];
        let filter = PunchFilter::new().with_scheduled_prefix(4);
        assert_eq!(filter.filter(&row), vec!["07:54", "12:10", "13:05", "18:02"]);
    }

    #[test]
    fn test_early_time_after_sequence_is_excluded() {
        let row = [
            "08:00", "12:00", "13:00", "17:00", "07:54", "12:10", "13:05", "18:02", "06:00",
        ];
        let filter = PunchFilter::new().with_scheduled_prefix(4);
        assert_eq!(filter.filter(&row), vec!["07:54", "12:10", "13:05", "18:02"]);
    }

    #[test]
    fn test_short_row_keeps_all_candidates() {
        let row = ["07:58", "12:02", "13:01"];
        let filter = PunchFilter::new().with_scheduled_prefix(4);
        assert_eq!(filter.filter(&row), vec!["07:58", "12:02", "13:01"]);
    }

    #[test]
    fn test_non_increasing_and_invalid_are_discarded() {
        let row = ["08:00", "07:59", "25:10", "12:00", "12:00", "13:00", "17:00", "18:00"];
        assert_eq!(
            PunchFilter::new().filter(&row),
            vec!["08:00", "12:00", "13:00", "17:00"]
        );
    }

    #[test]
    fn test_empty_row() {
        let row: [&str; 0] = [];
        assert!(PunchFilter::new().with_scheduled_prefix(4).filter(&row).is_empty());
    }
}

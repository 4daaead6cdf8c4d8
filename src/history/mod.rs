//! Article timestamps from version-control history.

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::collections::BTreeMap;

pub mod git;

pub use git::GitHistory;

/// Earliest and latest commit time touching a file, epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTimes {
    pub created: i64,
    pub updated: i64,
}

impl FileTimes {
    pub fn at(secs: i64) -> Self {
        Self { created: secs, updated: secs }
    }

    pub fn observe(&mut self, secs: i64) {
        self.created = self.created.min(secs);
        self.updated = self.updated.max(secs);
    }
}

/// Maps article paths (relative to the notes root) to their timestamps.
///
/// Paths without history are absent from the result.
pub trait HistorySource {
    fn file_times(&self, relatives: &[String]) -> Result<BTreeMap<String, FileTimes>>;
}

/// Fixed lookup table, used when timestamps come from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    pub times: BTreeMap<String, FileTimes>,
}

impl HistorySource for StaticHistory {
    fn file_times(&self, relatives: &[String]) -> Result<BTreeMap<String, FileTimes>> {
        Ok(relatives
            .iter()
            .filter_map(|rel| self.times.get(rel).map(|t| (rel.clone(), *t)))
            .collect())
    }
}

/// Render epoch seconds the way Hexo writes dates: `YYYY-M-D HH:MM:SS`.
pub fn format_date<Tz: TimeZone>(secs: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%Y-%-m-%-d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

pub fn format_local_date(secs: i64) -> String {
    format_date(secs, &Local)
}

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn formats_without_leading_zeros() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_date(0, &utc), "1970-1-1 00:00:00");
        // 2021-03-04 05:06:07 UTC
        assert_eq!(format_date(1_614_834_367, &utc), "2021-3-4 05:06:07");

        let plus8 = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(format_date(1_614_834_367, &plus8), "2021-3-4 13:06:07");
    }

    #[test]
    fn observe_keeps_created_before_updated() {
        let mut times = FileTimes::at(500);
        for t in [900, 100, 700] {
            times.observe(t);
        }
        assert_eq!(times, FileTimes { created: 100, updated: 900 });
    }
}

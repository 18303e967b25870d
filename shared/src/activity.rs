//! 仪表盘聚合
//!
//! 将带时间戳的记录按时间窗口过滤后，按自然日分桶计数，
//! 输出按日期升序排列的标签数组与等长计数数组，供图表直接渲染。

use crate::date::{chart_label, parse_timestamp_in};
use crate::profile::RegistrationRecord;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;

/// 可参与聚合的记录
pub trait Timestamped {
    fn timestamp(&self) -> &str;
}

impl Timestamped for RegistrationRecord {
    fn timestamp(&self) -> &str {
        &self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    All,
    Last90Days,
    Last60Days,
    Last30Days,
    Last7Days,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::All,
        TimeWindow::Last90Days,
        TimeWindow::Last60Days,
        TimeWindow::Last30Days,
        TimeWindow::Last7Days,
    ];

    /// 窗口天数，`All` 不限制
    pub fn days(&self) -> Option<i64> {
        match self {
            TimeWindow::All => None,
            TimeWindow::Last90Days => Some(90),
            TimeWindow::Last60Days => Some(60),
            TimeWindow::Last30Days => Some(30),
            TimeWindow::Last7Days => Some(7),
        }
    }

    /// `<select>` 使用的取值
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Last90Days => "last-90-days",
            TimeWindow::Last60Days => "last-60-days",
            TimeWindow::Last30Days => "last-30-days",
            TimeWindow::Last7Days => "last-7-days",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::All => "All time",
            TimeWindow::Last90Days => "Last 3 months",
            TimeWindow::Last60Days => "Last 2 months",
            TimeWindow::Last30Days => "Last month",
            TimeWindow::Last7Days => "Last week",
        }
    }

    pub fn from_value(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == value)
            .unwrap_or_default()
    }

    /// 窗口起点（含）
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.days().map(|d| now - Duration::days(d))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySeries {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl ActivitySeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(String::as_str).zip(self.counts.iter().copied())
    }
}

/// 按日期分桶计数
///
/// 分桶与窗口起点都使用 `now` 所在时区的自然日，无法解析时间戳的记录会被忽略。
pub fn bucket_by_date<T: Timestamped, Tz: TimeZone>(
    records: &[T],
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> ActivitySeries {
    let tz = now.timezone();
    let cutoff = window.cutoff(now.naive_local());

    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in records
        .iter()
        .filter_map(|r| parse_timestamp_in(r.timestamp(), &tz))
    {
        if cutoff.is_some_and(|c| ts < c) {
            continue;
        }
        *buckets.entry(ts.date()).or_default() += 1;
    }

    let (labels, counts) = buckets
        .into_iter()
        .map(|(date, count)| (chart_label(date), count))
        .unzip();
    ActivitySeries { labels, counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    struct Rec(&'static str);

    impl Timestamped for Rec {
        fn timestamp(&self) -> &str {
            self.0
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&parse_timestamp_in(s, &Utc).unwrap())
    }

    #[test]
    fn groups_and_orders_by_date() {
        let records = [Rec("2025-01-01"), Rec("2025-01-01"), Rec("2025-01-02")];
        let series = bucket_by_date(&records, TimeWindow::All, &at("2025-06-01"));
        assert_eq!(series.labels, vec!["1/1/2025", "1/2/2025"]);
        assert_eq!(series.counts, vec![2, 1]);
    }

    #[test]
    fn ordering_is_chronological_not_lexical() {
        let records = [
            Rec("2025-10-02T08:00:00"),
            Rec("2025-09-30T23:59:00"),
            Rec("2024-12-31T00:00:00"),
        ];
        let series = bucket_by_date(&records, TimeWindow::All, &at("2025-10-03"));
        assert_eq!(series.labels, vec!["12/31/2024", "9/30/2025", "10/2/2025"]);
    }

    #[test]
    fn window_cutoff_is_inclusive() {
        let now = at("2025-01-31T12:00:00");
        let records = [
            Rec("2025-01-24T12:00:00"),
            Rec("2025-01-24T11:59:59"),
            Rec("2025-01-30T00:00:00"),
        ];
        let series = bucket_by_date(&records, TimeWindow::Last7Days, &now);
        assert_eq!(series.labels, vec!["1/24/2025", "1/30/2025"]);
        assert_eq!(series.counts, vec![1, 1]);
        assert_eq!(series.total(), 2);
    }

    #[test]
    fn offset_records_bucket_by_the_viewers_calendar_day() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = ist.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let records = [
            Rec("2025-01-01T23:30:00+05:30"),
            Rec("2025-01-02T01:00:00+05:30"),
        ];
        let series = bucket_by_date(&records, TimeWindow::All, &now);
        assert_eq!(series.labels, vec!["1/1/2025", "1/2/2025"]);
        assert_eq!(series.counts, vec![1, 1]);

        // 同一时刻在 UTC 下落在同一天
        let utc_now = now.with_timezone(&Utc);
        let series = bucket_by_date(&records, TimeWindow::All, &utc_now);
        assert_eq!(series.labels, vec!["1/1/2025"]);
        assert_eq!(series.counts, vec![2]);
    }

    #[test]
    fn window_cutoff_uses_the_viewers_clock() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        // 本地 1/8 02:00，UTC 仍是 1/7
        let now = ist.with_ymd_and_hms(2025, 1, 8, 2, 0, 0).unwrap();
        let records = [Rec("2025-01-01T01:00:00+05:30"), Rec("2025-01-01T03:00:00+05:30")];
        let series = bucket_by_date(&records, TimeWindow::Last7Days, &now);
        assert_eq!(series.counts, vec![1]);
    }

    #[test]
    fn unparseable_records_are_skipped() {
        let records = [Rec("not a date"), Rec("2025-02-01")];
        let series = bucket_by_date(&records, TimeWindow::All, &at("2025-03-01"));
        assert_eq!(series.counts, vec![1]);
        assert_eq!(series.max_count(), 1);
    }

    #[test]
    fn window_values_round_trip_through_select() {
        for w in TimeWindow::ALL {
            assert_eq!(TimeWindow::from_value(w.as_str()), w);
        }
        assert_eq!(TimeWindow::from_value("bogus"), TimeWindow::All);
    }
}

//! 时间处理模块
//!
//! 后端以 ISO 8601 字符串传输时间，常见形式：
//! - `2025-01-01`
//! - `2025-01-01T10:00:00` / `2025-01-01T10:00:00.123`
//! - `2025-01-01T10:00:00Z` / `2025-01-01T10:00:00+08:00`
//!
//! 这里统一解析为观看者所在时区的墙上时间（`NaiveDateTime`），
//! 并提供界面使用的格式化函数。

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// 按 `tz` 解析后端时间字符串
///
/// 带偏移的时间换算到 `tz` 的墙上时间；不带偏移的时间视为已是本地时间。
/// 无法识别的格式返回 `None`。
pub fn parse_timestamp_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz).naive_local());
    }

    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// 按浏览器本地时区解析
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    parse_timestamp_in(s, &Local)
}

/// 图表横轴标签：`M/D/YYYY`
pub fn chart_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// 卡片上显示的发布时间，无法解析时原样返回
pub fn display_datetime(s: &str) -> String {
    match parse_timestamp(s) {
        Some(dt) => dt.format("%-m/%-d/%Y %H:%M").to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_date_as_midnight() {
        let dt = parse_timestamp("2025-01-02").unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 2));
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn parses_local_datetime_with_and_without_fraction() {
        assert_eq!(
            parse_timestamp("2025-03-04T05:06:07").unwrap().date(),
            ymd(2025, 3, 4)
        );
        assert_eq!(
            parse_timestamp("2025-03-04T05:06:07.891").unwrap().date(),
            ymd(2025, 3, 4)
        );
        assert_eq!(
            parse_timestamp("2025-03-04 05:06:07").unwrap().date(),
            ymd(2025, 3, 4)
        );
    }

    #[test]
    fn offset_datetimes_are_shifted_into_the_target_zone() {
        let dt = parse_timestamp_in("2025-03-04T01:00:00+02:00", &Utc).unwrap();
        assert_eq!(dt.date(), ymd(2025, 3, 3));

        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let dt = parse_timestamp_in("2025-01-01T20:00:00Z", &ist).unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 2));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(1, 30, 0).unwrap());
    }

    #[test]
    fn naive_datetimes_are_taken_as_local_wall_clock() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let dt = parse_timestamp_in("2025-01-01T23:30:00", &ist).unwrap();
        assert_eq!(dt.date(), ymd(2025, 1, 1));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn chart_labels_have_no_padding() {
        assert_eq!(chart_label(ymd(2025, 1, 1)), "1/1/2025");
        assert_eq!(chart_label(ymd(2024, 12, 31)), "12/31/2024");
    }

    #[test]
    fn display_falls_back_to_raw_input() {
        assert_eq!(display_datetime("2025-01-01T09:30:00"), "1/1/2025 09:30");
        assert_eq!(display_datetime("soon"), "soon");
    }
}

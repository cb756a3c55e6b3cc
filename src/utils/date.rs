//! 考勤日期规范化
//!
//! 客户端可能提交纯日期、带时区的 RFC 3339 时间戳或不带时区的时间。
//! 规范化结果为客户端书写的日历日期，去掉时间和时区部分；
//! 存储时使用该日期 UTC 零点的时间戳，与服务器时区无关。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::{AttendanceSystemError, Result};

/// 规范化考勤日期
pub fn normalize_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AttendanceSystemError::date_parse("date is empty"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    // 带偏移量的时间戳保留客户端的本地日期
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.date());
        }
    }

    Err(AttendanceSystemError::date_parse(format!(
        "invalid date '{trimmed}', expected YYYY-MM-DD or an RFC 3339 timestamp"
    )))
}

/// 解析可选的日期范围，两端均为闭区间
pub fn normalize_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let start = start.map(normalize_date).transpose()?;
    let end = end.map(normalize_date).transpose()?;
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        return Err(AttendanceSystemError::validation(
            "start_date must not be after end_date",
        ));
    }
    Ok((start, end))
}

/// 日期转换为当天 UTC 零点的时间戳
pub fn date_to_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// 时间戳转换回日历日期
pub fn timestamp_to_date(ts: i64) -> NaiveDate {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov9() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 9).unwrap()
    }

    #[test]
    fn test_sub_day_timestamps_share_one_date() {
        for input in [
            "2025-11-09",
            "2025-11-09T10:30:00Z",
            "2025-11-09T23:45:00Z",
            "2025-11-09T23:45:00-05:00",
            "2025-11-09T00:15:00+09:00",
            "2025-11-09T08:00:00.123",
        ] {
            assert_eq!(normalize_date(input).unwrap(), nov9(), "input: {input}");
        }
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert!(normalize_date("2025-02-30").is_err());
        assert!(normalize_date("not-a-date").is_err());
        assert!(normalize_date("").is_err());
    }

    #[test]
    fn test_timestamp_is_utc_midnight() {
        let ts = date_to_timestamp(nov9());
        assert_eq!(ts % 86_400, 0);
        assert_eq!(timestamp_to_date(ts), nov9());
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(normalize_range(Some("2025-11-10"), Some("2025-11-09")).is_err());
        let (s, e) = normalize_range(Some("2025-11-01"), None).unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2025, 11, 1));
        assert_eq!(e, None);
    }
}

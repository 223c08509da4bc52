//! Korean date and relative-time formatting.

use crate::clock::EpochMillis;
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `2024년 1월 5일`
    #[default]
    Short,
    /// `2024년 1월 5일 금요일`
    Long,
    /// `오후 03:04`
    Time,
}

/// Formats `timestamp` in the local time zone.
pub fn format_date(timestamp: EpochMillis, format: DateFormat) -> String {
    format_date_in(timestamp, format, &Local)
}

pub fn format_date_in<Tz: TimeZone>(timestamp: EpochMillis, format: DateFormat, tz: &Tz) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp_millis(timestamp) else {
        return String::new();
    };
    let local = utc.with_timezone(tz);
    let date = format!("{}년 {}월 {}일", local.year(), local.month(), local.day());
    match format {
        DateFormat::Short => date,
        DateFormat::Long => format!("{date} {}", weekday_name(local.weekday())),
        DateFormat::Time => {
            let (is_pm, hour) = local.hour12();
            let meridiem = if is_pm { "오후" } else { "오전" };
            format!("{meridiem} {hour:02}:{:02}", local.minute())
        }
    }
}

/// "방금 전", "N분 전", "N시간 전", "N일 전", else the short date.
pub fn relative_time(timestamp: EpochMillis, now: EpochMillis) -> String {
    relative_time_in(timestamp, now, &Local)
}

pub fn relative_time_in<Tz: TimeZone>(timestamp: EpochMillis, now: EpochMillis, tz: &Tz) -> String {
    let seconds = now.saturating_sub(timestamp) / 1_000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "방금 전".to_string()
    } else if minutes < 60 {
        format!("{minutes}분 전")
    } else if hours < 24 {
        format!("{hours}시간 전")
    } else if days < 7 {
        format!("{days}일 전")
    } else {
        format_date_in(timestamp, DateFormat::Short, tz)
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

#[cfg(test)]
mod tests {
    use super::{format_date_in, relative_time_in, DateFormat};
    use chrono::Utc;

    // 2024-01-05T15:04:00Z, a Friday.
    const FRIDAY_AFTERNOON: i64 = 1_704_467_040_000;

    #[test]
    fn formats_short_long_and_time() {
        assert_eq!(
            format_date_in(FRIDAY_AFTERNOON, DateFormat::Short, &Utc),
            "2024년 1월 5일"
        );
        assert_eq!(
            format_date_in(FRIDAY_AFTERNOON, DateFormat::Long, &Utc),
            "2024년 1월 5일 금요일"
        );
        assert_eq!(format_date_in(FRIDAY_AFTERNOON, DateFormat::Time, &Utc), "오후 03:04");
    }

    #[test]
    fn relative_time_buckets() {
        let now = FRIDAY_AFTERNOON;
        assert_eq!(relative_time_in(now - 59_000, now, &Utc), "방금 전");
        assert_eq!(relative_time_in(now - 5 * 60_000, now, &Utc), "5분 전");
        assert_eq!(relative_time_in(now - 3 * 3_600_000, now, &Utc), "3시간 전");
        assert_eq!(relative_time_in(now - 2 * 86_400_000, now, &Utc), "2일 전");
        assert_eq!(
            relative_time_in(now - 8 * 86_400_000, now, &Utc),
            "2023년 12월 28일"
        );
        assert_eq!(relative_time_in(now + 10_000, now, &Utc), "방금 전");
    }
}

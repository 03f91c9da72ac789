/// NSE market session and timing utilities
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Asia::Kolkata;

// 9:15 AM and 3:30 PM IST, as seconds from midnight
const MARKET_OPEN_SECS: u32 = 9 * 3600 + 15 * 60;
const MARKET_CLOSE_SECS: u32 = 15 * 3600 + 30 * 60;

/// Monday to Friday in IST (exchange holidays are not modelled)
pub fn is_trading_day(now: DateTime<Utc>) -> bool {
    let weekday = now.with_timezone(&Kolkata).weekday();
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Check if the market is open; both session bounds are inclusive
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    if !is_trading_day(now) {
        return false;
    }
    let secs = now.with_timezone(&Kolkata).num_seconds_from_midnight();
    (MARKET_OPEN_SECS..=MARKET_CLOSE_SECS).contains(&secs)
}

/// Session open/close for the IST calendar day containing `date`
pub fn market_timings(date: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let date_ist = date.with_timezone(&Kolkata);
    let at = |secs: u32| {
        Kolkata
            .with_ymd_and_hms(
                date_ist.year(),
                date_ist.month(),
                date_ist.day(),
                secs / 3600,
                (secs % 3600) / 60,
                0,
            )
            .single()
            .map(|t| t.with_timezone(&Utc))
    };
    Some((at(MARKET_OPEN_SECS)?, at(MARKET_CLOSE_SECS)?))
}

/// First session open strictly after `now`
pub fn next_market_open(now: DateTime<Utc>) -> DateTime<Utc> {
    (0..=7)
        .filter_map(|days| market_timings(now + Duration::days(days)))
        .map(|(open, _)| open)
        .find(|open| *open > now && is_trading_day(*open))
        .unwrap_or_else(|| now + Duration::days(1))
}

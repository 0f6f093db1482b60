use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds elapsed since the midnight of a service day.
///
/// Values of 86 400 and above are legal and describe trips that keep running
/// past midnight; `25:30:00` belongs to the previous service day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Time {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Parses `HH:MM:SS`. The hour field is unbounded, so `25:30:00` parses.
    pub fn from_hms(time: &str) -> Option<Self> {
        const HOUR_TO_SEC: u32 = 60 * 60;
        const MINUTE_TO_SEC: u32 = 60;
        let mut split = time.split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some(Self(hours * HOUR_TO_SEC + minutes * MINUTE_TO_SEC + seconds))
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", h, m, s)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

/// A span of wall-clock seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

/// An absolute second on a continuous timeline spanning service days.
///
/// Encoded as `days-from-CE * 86 400 + seconds-of-day`, which makes service
/// day and time-of-day recoverable with plain integer arithmetic and keeps
/// ordering across midnight boundaries trivial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant(i64);

impl Instant {
    /// The instant at which `time` of the service day `day` occurs. `time`
    /// may exceed 24 h, in which case the instant lies on a later calendar
    /// day while still belonging to `day`'s schedule.
    pub fn from_service_day(day: NaiveDate, time: Time) -> Self {
        Self(i64::from(day.num_days_from_ce()) * SECONDS_PER_DAY + i64::from(time.as_seconds()))
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self::from_service_day(
            datetime.date(),
            Time::from_seconds(datetime.time().num_seconds_from_midnight()),
        )
    }

    /// The calendar day this instant falls on.
    pub fn service_day(&self) -> NaiveDate {
        let days = self.0.div_euclid(SECONDS_PER_DAY) as i32;
        NaiveDate::from_num_days_from_ce_opt(days).expect("instant outside the chrono date range")
    }

    pub fn time_of_day(&self) -> Time {
        Time(self.0.rem_euclid(SECONDS_PER_DAY) as u32)
    }

    pub const fn as_seconds(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.service_day(), self.time_of_day())
    }
}

impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + i64::from(rhs.0))
    }
}

impl Add<Time> for Instant {
    type Output = Self;

    fn add(self, rhs: Time) -> Self::Output {
        Self(self.0 + i64::from(rhs.0))
    }
}

impl Sub<Time> for Instant {
    type Output = Self;

    fn sub(self, rhs: Time) -> Self::Output {
        Self(self.0 - i64::from(rhs.0))
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        Duration((self.0 - rhs.0).max(0) as u32)
    }
}

/// Parses the `YYYYMMDD` date format of the calendar files.
pub fn parse_service_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y%m%d").ok()
}

#[test]
fn parse_unparse_midnight() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_string())
}

#[test]
fn parse_unparse_afternoon() {
    let time = "12:30:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_string())
}

#[test]
fn parse_past_midnight() {
    let time = "25:30:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(stime.as_seconds(), 25 * 3600 + 30 * 60);
    assert_eq!(time, stime.to_string())
}

#[test]
fn parse_rejects_garbage() {
    assert!(Time::from_hms("00:00:0a").is_none());
    assert!(Time::from_hms("00:00").is_none());
    assert!(Time::from_hms("00:61:00").is_none());
    assert!(Time::from_hms("10:00:00:00").is_none());
}

#[test]
fn instant_roundtrip() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let at = Instant::from_service_day(day, Time::from_hms("09:30:00").unwrap());
    assert_eq!(at.service_day(), day);
    assert_eq!(at.time_of_day(), Time::from_seconds(9 * 3600 + 30 * 60));
}

#[test]
fn instant_overnight_lands_on_next_day() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let at = Instant::from_service_day(day, Time::from_hms("25:30:00").unwrap());
    assert_eq!(at.service_day(), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
    assert_eq!(at.time_of_day(), Time::from_hms("01:30:00").unwrap());
}

#[test]
fn instant_ordering_across_days() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let next = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
    let late = Instant::from_service_day(day, Time::from_hms("25:30:00").unwrap());
    let early = Instant::from_service_day(next, Time::from_hms("01:00:00").unwrap());
    assert!(early < late);
    assert_eq!(late - early, Duration::from_minutes(30));
}

#[test]
fn service_day_parsing() {
    assert_eq!(
        parse_service_day("20250101"),
        NaiveDate::from_ymd_opt(2025, 1, 1)
    );
    assert!(parse_service_day("2025-01-01").is_none());
    assert!(parse_service_day("202501").is_none());
}

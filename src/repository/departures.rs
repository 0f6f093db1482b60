use chrono::NaiveDate;

use crate::{
    repository::Repository,
    shared::time::{Instant, Time},
};

/// One row of a stop's departure table: a boardable stop time, keyed by its
/// relative departure time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepartureEntry {
    pub departure: Time,
    pub trip_idx: u32,
    /// Position of the stop time within its trip.
    pub pos: u32,
}

/// A departure projected onto the absolute timeline of a concrete service
/// day.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledDeparture {
    pub at: Instant,
    pub trip_idx: u32,
    /// Position of the boarded stop time within the trip.
    pub pos: u32,
}

/// Resumable position in a stop's departure table.
///
/// The cursor walks a small window of candidate service days side by side
/// and merges them into one non-decreasing sequence of absolute instants.
/// The day before the lower bound covers past-midnight departures of
/// overnight trips; the window extends to the day of the upper bound.
/// Positioning within each day is a binary search; every subsequent step is
/// a constant-size merge. Plain data apart from the handles, so frontier
/// state stays cheap to keep around.
#[derive(Debug, Clone)]
pub(crate) struct DepartureCursor {
    stop_idx: u32,
    until: Instant,
    days: Vec<DayCursor>,
}

#[derive(Debug, Clone, Copy)]
struct DayCursor {
    day: NaiveDate,
    midnight: Instant,
    pos: usize,
}

impl DepartureCursor {
    pub(crate) fn new(repository: &Repository, stop_idx: u32, from: Instant, until: Instant) -> Self {
        let table = repository.departure_table(stop_idx);
        let mut days = Vec::new();
        let first = from.service_day();
        let mut day = first.pred_opt().unwrap_or(first);
        while day <= until.service_day() {
            let midnight = Instant::from_service_day(day, Time::from_seconds(0));
            let pos = table.partition_point(|entry| midnight + entry.departure < from);
            if pos < table.len() {
                days.push(DayCursor { day, midnight, pos });
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        Self {
            stop_idx,
            until,
            days,
        }
    }

    /// The next departure at or after the cursor position whose service runs
    /// on the respective day, in non-decreasing instant order.
    pub(crate) fn next(&mut self, repository: &Repository) -> Option<ScheduledDeparture> {
        let table = repository.departure_table(self.stop_idx);
        loop {
            let mut earliest: Option<(usize, Instant)> = None;
            for (i, cursor) in self.days.iter().enumerate() {
                if let Some(entry) = table.get(cursor.pos) {
                    let at = cursor.midnight + entry.departure;
                    if earliest.is_none_or(|(_, best)| at < best) {
                        earliest = Some((i, at));
                    }
                }
            }
            let (i, at) = earliest?;
            if at > self.until {
                return None;
            }
            let day = self.days[i].day;
            let entry = table[self.days[i].pos];
            self.days[i].pos += 1;

            let trip = &repository.trips[entry.trip_idx as usize];
            if repository.runs_on(trip.service_idx, day) {
                return Some(ScheduledDeparture {
                    at,
                    trip_idx: entry.trip_idx,
                    pos: entry.pos,
                });
            }
        }
    }
}

/// Lazy sequence of boardable departures from one stop, ordered by
/// increasing absolute instant. Created by [`Repository::departures_at`].
pub struct Departures<'a> {
    repository: &'a Repository,
    cursor: DepartureCursor,
}

impl<'a> Departures<'a> {
    pub(crate) fn new(repository: &'a Repository, cursor: DepartureCursor) -> Self {
        Self { repository, cursor }
    }
}

impl Iterator for Departures<'_> {
    type Item = ScheduledDeparture;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.repository)
    }
}

use std::cmp::Ordering;

use crate::shared::time::Instant;

/// Figure of merit for a journey prefix, totally ordered: earliest arrival
/// wins, ties go to the latest departure from the origin (the shortest
/// actual travel time), remaining ties to the fewest vehicle legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionQuality {
    /// Arrival instant at the place this quality is recorded for.
    pub arrival: Instant,
    /// Departure instant from the origin of the journey.
    pub departure: Instant,
    /// Number of vehicle legs boarded so far.
    pub rides: u32,
}

impl ConnectionQuality {
    /// Transfers as reported to riders: one fewer than the boarded legs.
    pub fn transfers(&self) -> u32 {
        self.rides.saturating_sub(1)
    }

    /// Whether recording this quality would strictly improve on `best`.
    pub(crate) fn improves(&self, best: Option<&ConnectionQuality>) -> bool {
        best.is_none_or(|best| self < best)
    }
}

impl Ord for ConnectionQuality {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arrival
            .cmp(&other.arrival)
            .then_with(|| other.departure.cmp(&self.departure))
            .then_with(|| self.rides.cmp(&other.rides))
    }
}

impl PartialOrd for ConnectionQuality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::time::{Instant, Time};
    use chrono::NaiveDate;

    fn at(seconds: u32) -> Instant {
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        Instant::from_service_day(day, Time::from_seconds(seconds))
    }

    fn quality(arrival: u32, departure: u32, rides: u32) -> ConnectionQuality {
        ConnectionQuality {
            arrival: at(arrival),
            departure: at(departure),
            rides,
        }
    }

    #[test]
    fn earlier_arrival_wins() {
        assert!(quality(100, 0, 5) < quality(101, 50, 1));
    }

    #[test]
    fn later_departure_breaks_arrival_ties() {
        assert!(quality(100, 50, 2) < quality(100, 10, 1));
    }

    #[test]
    fn fewer_rides_break_remaining_ties() {
        assert!(quality(100, 50, 1) < quality(100, 50, 2));
    }

    #[test]
    fn equal_quality_is_not_an_improvement() {
        let best = quality(100, 50, 1);
        assert!(!best.improves(Some(&best)));
        assert!(best.improves(None));
        assert!(quality(100, 50 + 60, 1).improves(Some(&best)));
    }
}

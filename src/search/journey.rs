use std::sync::Arc;

use crate::{
    search::quality::ConnectionQuality,
    shared::time::{Duration, Instant},
};

/// One leg of a journey: either riding a vehicle or walking a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Ride {
        trip_idx: u32,
        board_stop_idx: u32,
        alight_stop_idx: u32,
        departure: Instant,
        arrival: Instant,
    },
    Walk {
        from_stop_idx: u32,
        to_stop_idx: u32,
        departure: Instant,
        arrival: Instant,
    },
}

impl Segment {
    pub fn departure(&self) -> Instant {
        match *self {
            Segment::Ride { departure, .. } => departure,
            Segment::Walk { departure, .. } => departure,
        }
    }

    pub fn arrival(&self) -> Instant {
        match *self {
            Segment::Ride { arrival, .. } => arrival,
            Segment::Walk { arrival, .. } => arrival,
        }
    }

    pub fn is_ride(&self) -> bool {
        matches!(self, Segment::Ride { .. })
    }
}

/// A completed journey from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    /// Legs in travel order.
    pub segments: Vec<Segment>,
}

impl Journey {
    pub fn departure(&self) -> Option<Instant> {
        self.segments.first().map(Segment::departure)
    }

    pub fn arrival(&self) -> Option<Instant> {
        self.segments.last().map(Segment::arrival)
    }

    pub fn duration(&self) -> Option<Duration> {
        Some(self.arrival()? - self.departure()?)
    }

    /// Number of changes between vehicles; walking legs do not count.
    pub fn transfers(&self) -> u32 {
        let rides = self.segments.iter().filter(|s| s.is_ride()).count() as u32;
        rides.saturating_sub(1)
    }
}

/// A shared, immutable prefix journey.
///
/// Visitors fan out from common prefixes by the thousands, so extending a
/// prefix prepends one node in front of the shared tail instead of copying:
/// the tail is reference-counted and never mutated. Ride count and origin
/// departure are cached per node to keep quality computation O(1).
#[derive(Debug, Clone, Default)]
pub(crate) struct Prefix(Option<Arc<PrefixNode>>);

#[derive(Debug)]
struct PrefixNode {
    segment: Segment,
    rides: u32,
    departure: Instant,
    parent: Prefix,
}

impl Prefix {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn extend(&self, segment: Segment) -> Self {
        let rides = self.rides() + u32::from(segment.is_ride());
        let departure = self.departure().unwrap_or(segment.departure());
        Self(Some(Arc::new(PrefixNode {
            segment,
            rides,
            departure,
            parent: self.clone(),
        })))
    }

    /// Vehicle legs boarded so far.
    pub fn rides(&self) -> u32 {
        self.0.as_ref().map_or(0, |node| node.rides)
    }

    /// Departure instant from the origin; `None` while no leg is taken yet.
    pub fn departure(&self) -> Option<Instant> {
        self.0.as_ref().map(|node| node.departure)
    }

    /// Quality of this prefix when it reaches some place at `arrival`.
    pub fn quality_at(&self, arrival: Instant) -> ConnectionQuality {
        ConnectionQuality {
            arrival,
            departure: self.departure().unwrap_or(arrival),
            rides: self.rides(),
        }
    }

    /// Materialises the prefix into a journey, legs in travel order.
    pub fn to_journey(&self) -> Journey {
        let mut segments = Vec::new();
        let mut next = &self.0;
        while let Some(node) = next {
            segments.push(node.segment);
            next = &node.parent.0;
        }
        segments.reverse();
        Journey { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::time::Time;
    use chrono::NaiveDate;

    fn at(seconds: u32) -> Instant {
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        Instant::from_service_day(day, Time::from_seconds(seconds))
    }

    fn ride(trip_idx: u32, from: u32, to: u32, departure: u32, arrival: u32) -> Segment {
        Segment::Ride {
            trip_idx,
            board_stop_idx: from,
            alight_stop_idx: to,
            departure: at(departure),
            arrival: at(arrival),
        }
    }

    #[test]
    fn extension_shares_the_tail() {
        let base = Prefix::empty().extend(ride(0, 0, 1, 100, 200));
        let left = base.extend(ride(1, 1, 2, 260, 300));
        let right = base.extend(ride(2, 1, 3, 280, 320));

        assert_eq!(left.to_journey().segments[0], right.to_journey().segments[0]);
        assert_eq!(left.rides(), 2);
        assert_eq!(base.rides(), 1);
    }

    #[test]
    fn departure_is_the_first_leg() {
        let walk = Segment::Walk {
            from_stop_idx: 0,
            to_stop_idx: 1,
            departure: at(50),
            arrival: at(110),
        };
        let prefix = Prefix::empty().extend(walk).extend(ride(0, 1, 2, 150, 240));
        assert_eq!(prefix.departure(), Some(at(50)));
        assert_eq!(prefix.rides(), 1);

        let journey = prefix.to_journey();
        assert_eq!(journey.departure(), Some(at(50)));
        assert_eq!(journey.arrival(), Some(at(240)));
        assert_eq!(journey.transfers(), 0);
        assert_eq!(journey.duration(), Some(Duration::from_seconds(190)));
    }

    #[test]
    fn empty_prefix_quality_falls_back_to_arrival() {
        let quality = Prefix::empty().quality_at(at(500));
        assert_eq!(quality.departure, at(500));
        assert_eq!(quality.rides, 0);
    }
}

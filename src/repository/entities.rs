use std::{collections::HashSet, sync::Arc};

use chrono::{Datelike, NaiveDate};

use crate::shared::{
    Identifiable,
    time::{Duration, Time},
};

/// A physical point where passengers board or leave a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// The global internal index used for O(1) array lookups in the repository.
    pub index: u32,
    /// The unique external identifier.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Main St & 4th Ave").
    pub name: Arc<str>,
    /// Normalized name used for autocomplete comparisons.
    pub normalized_name: Arc<str>,
    /// Station this stop belongs to, when the feed groups platforms.
    pub parent_station: Option<Arc<str>>,
    /// Value of the configured transfer-node column, when present.
    pub node_id: Option<Arc<str>>,
}

impl Identifiable for Stop {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

/// Vehicle classification: the classic GTFS route types plus the supported
/// Google extended blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
    RailwayService,
    CoachService,
    SuburbanRailwayService,
    UrbanRailwayService,
    BusService,
    TrolleybusService,
    TramService,
    WaterTransportService,
    AirService,
    FerryService,
    AerialLiftService,
    FunicularService,
    TaxiService,
    MiscellaneousService,
}

impl RouteKind {
    /// Maps a `route_type` code. `None` for codes outside both the classic
    /// set and the supported extended blocks.
    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            0 => Self::Tram,
            1 => Self::Subway,
            2 => Self::Rail,
            3 => Self::Bus,
            4 => Self::Ferry,
            5 => Self::CableTram,
            6 => Self::AerialLift,
            7 => Self::Funicular,
            11 => Self::Trolleybus,
            12 => Self::Monorail,
            100..=117 => Self::RailwayService,
            200..=209 => Self::CoachService,
            300 => Self::SuburbanRailwayService,
            400..=405 => Self::UrbanRailwayService,
            700..=716 => Self::BusService,
            800 => Self::TrolleybusService,
            900..=906 => Self::TramService,
            1000 => Self::WaterTransportService,
            1100 => Self::AirService,
            1200 => Self::FerryService,
            1300..=1307 => Self::AerialLiftService,
            1400 => Self::FunicularService,
            1500..=1507 => Self::TaxiService,
            1700 => Self::MiscellaneousService,
            _ => return None,
        };
        Some(kind)
    }
}

/// A grouping of trips displayed to riders under a single name.
#[derive(Debug, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    /// Rider-facing name; falls back to the long name when the feed carries
    /// no short one.
    pub short_name: Arc<str>,
    pub kind: RouteKind,
}

/// A specific journey taken by a vehicle through a sequence of stops.
#[derive(Debug, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: Arc<str>,
    /// Pointer to the parent [`Route`].
    pub route_idx: u32,
    /// Pointer to the [`Service`] deciding the days this trip operates.
    pub service_idx: u32,
}

/// One scheduled visit of a trip to a stop.
#[derive(Debug, Clone, Copy)]
pub struct StopTime {
    /// Internal index of the parent [`Trip`].
    pub trip_idx: u32,
    /// Internal index of the visited [`Stop`].
    pub stop_idx: u32,
    /// The feed's ordering key within the trip.
    pub sequence: u32,
    /// Scheduled arrival, relative to the trip's service-day midnight.
    pub arrival: Time,
    /// Scheduled departure, relative to the trip's service-day midnight.
    pub departure: Time,
    /// Whether passengers may board here.
    pub pickup: bool,
    /// Whether passengers may alight here.
    pub dropoff: bool,
}

/// Metadata describing a contiguous range within the global `stop_times`
/// arena.
#[derive(Default, Debug, Clone, Copy)]
pub struct Slice {
    pub start_idx: u32,
    pub count: u32,
}

/// The recurrence pattern deciding on which days a trip operates: a weekly
/// pattern bounded by a date range, adjusted by per-date exceptions.
#[derive(Debug, Clone)]
pub struct Service {
    pub index: u32,
    pub id: Arc<str>,
    /// Monday-first weekday availability.
    pub weekdays: [bool; 7],
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Dates service was added outside the weekly pattern.
    pub added: HashSet<NaiveDate>,
    /// Dates service was withdrawn from the weekly pattern.
    pub removed: HashSet<NaiveDate>,
}

impl Service {
    /// A service defined solely by date exceptions; the weekly pattern never
    /// matches.
    pub(crate) fn exceptions_only(index: u32, id: Arc<str>) -> Self {
        Self {
            index,
            id,
            weekdays: [false; 7],
            start: NaiveDate::MAX,
            end: NaiveDate::MIN,
            added: HashSet::new(),
            removed: HashSet::new(),
        }
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if self.added.contains(&date) {
            return true;
        }
        if self.removed.contains(&date) {
            return false;
        }
        date >= self.start
            && date <= self.end
            && self.weekdays[date.weekday().num_days_from_monday() as usize]
    }
}

/// A directed walking edge between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from_stop_idx: u32,
    pub to_stop_idx: u32,
    /// Minimum time needed to make the transfer.
    pub duration: Duration,
}

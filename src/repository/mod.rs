mod departures;
mod entities;
pub mod source;

pub use departures::{Departures, ScheduledDeparture};
pub use entities::*;

pub(crate) use departures::{DepartureCursor, DepartureEntry};

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    search::Search,
    shared::{self, time::Instant},
};

/// Everything that can go wrong while building the repository from a feed.
/// Reported once; a failed load aborts startup.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Gtfs(#[from] crate::gtfs::Error),
    #[error("{context} references unknown stop id: {id}")]
    UnknownStop { context: &'static str, id: String },
    #[error("trip {trip} references unknown route id: {id}")]
    UnknownRoute { trip: String, id: String },
    #[error("trip {trip} references unknown service id: {id}")]
    UnknownService { trip: String, id: String },
    #[error("stop_times references unknown trip id: {id}")]
    UnknownTrip { id: String },
    #[error("invalid time value {value:?} in trip {trip}")]
    InvalidTime { trip: String, value: String },
    #[error("invalid date value {value:?} for service {service}")]
    InvalidDate { service: String, value: String },
    #[error("invalid exception_type {value} for service {service}")]
    InvalidException { service: String, value: u8 },
    #[error("unsupported route_type {code} on route {route}")]
    UnknownRouteType { route: String, code: i32 },
    #[error("route {0} has neither route_short_name nor route_long_name")]
    UnnamedRoute(String),
    #[error("stop times of trip {trip} are not ordered by time along their sequence")]
    UnorderedStopTimes { trip: String },
    #[error("unsupported feature: {0}")]
    Unsupported(String),
    #[error("transfer mode by_node_id requires a configured node column name")]
    MissingNodeColumn,
}

/// A read-only, memory-efficient store of one transit schedule.
///
/// The repository acts as a flattened relational database: entities live in
/// arenas addressed by stable `u32` handles, relationships are pre-resolved
/// adjacency tables, and the per-stop departure tables the search consults
/// are sorted once at load time. Built once during startup, immutable
/// afterwards, and therefore safe to share by reference across queries.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    /// Global list of all stops.
    pub stops: Box<[Stop]>,
    /// High-level transit routes (e.g., "Bus 42").
    pub routes: Box<[Route]>,
    /// Individual vehicle journeys occurring at specific times.
    pub trips: Box<[Trip]>,
    /// Calendars deciding the days each trip operates.
    pub services: Box<[Service]>,
    /// The arrival/departure events linking trips to stops, grouped per trip
    /// and ordered by sequence.
    pub stop_times: Box<[StopTime]>,
    /// Walking edges materialised for the configured transfer mode.
    pub transfers: Box<[Transfer]>,

    /// Maps unique external ids to indices within the respective arena.
    stop_lookup: HashMap<Arc<str>, u32>,
    route_lookup: HashMap<Arc<str>, u32>,
    trip_lookup: HashMap<Arc<str>, u32>,
    service_lookup: HashMap<Arc<str>, u32>,

    /// Range within `stop_times` belonging to each trip.
    trip_to_stop_slice: Box<[Slice]>,
    /// Boardable departures per stop, sorted by relative departure time.
    stop_departures: Box<[Box<[DepartureEntry]>]>,
    /// Index mapping: `stop_index -> [transfer_index, ...]`.
    stop_to_transfers: Box<[Box<[u32]>]>,
}

impl Repository {
    /// Creates a new, empty repository; populate it with
    /// [`load_gtfs`](Repository::load_gtfs).
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts an earliest-arrival search between two stop ids. Configure the
    /// departure instant and horizon on the returned builder, then call
    /// `solve`.
    pub fn connection(&self, origin: &str, destination: &str) -> Search<'_> {
        Search::new(self, origin, destination)
    }

    /// Retrieves a [`Stop`] by its external identifier.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let index = self.stop_lookup.get(id)?;
        Some(&self.stops[*index as usize])
    }

    /// Retrieves a [`Route`] by its external identifier.
    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index as usize])
    }

    /// Retrieves a [`Trip`] by its external identifier.
    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        let index = self.trip_lookup.get(id)?;
        Some(&self.trips[*index as usize])
    }

    /// Retrieves a [`Service`] by its external identifier.
    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        let index = self.service_lookup.get(id)?;
        Some(&self.services[*index as usize])
    }

    /// The stop times of a trip, ordered by sequence.
    pub fn stop_times_of(&self, trip_idx: u32) -> &[StopTime] {
        let slice = self.trip_to_stop_slice[trip_idx as usize];
        let start = slice.start_idx as usize;
        &self.stop_times[start..start + slice.count as usize]
    }

    /// The stop time at zero-based position `pos` of a trip, or `None` past
    /// the end of the trip.
    pub fn stop_time_at(&self, trip_idx: u32, pos: u32) -> Option<&StopTime> {
        self.stop_times_of(trip_idx).get(pos as usize)
    }

    /// Whether the service operates on the given day.
    pub fn runs_on(&self, service_idx: u32, date: NaiveDate) -> bool {
        self.services[service_idx as usize].runs_on(date)
    }

    /// All walking edges leaving a stop. Waiting in place is always
    /// possible, so the reflexive zero-cost edge is yielded first.
    pub fn transfers_from(&self, stop_idx: u32) -> impl Iterator<Item = Transfer> + '_ {
        (0..).map_while(move |edge| self.transfer_edge(stop_idx, edge))
    }

    /// The `edge`-th walking edge out of a stop; edge 0 is the reflexive
    /// zero-cost self-transfer.
    pub(crate) fn transfer_edge(&self, stop_idx: u32, edge: u32) -> Option<Transfer> {
        if edge == 0 {
            return Some(Transfer {
                from_stop_idx: stop_idx,
                to_stop_idx: stop_idx,
                duration: Default::default(),
            });
        }
        let transfer_idx = *self.stop_to_transfers[stop_idx as usize].get(edge as usize - 1)?;
        Some(self.transfers[transfer_idx as usize])
    }

    /// Boardable departures from a stop within `[from, until]`, in
    /// increasing absolute instant order, filtered to services active on the
    /// respective day.
    pub fn departures_at(&self, stop_idx: u32, from: Instant, until: Instant) -> Departures<'_> {
        Departures::new(self, self.departure_cursor(stop_idx, from, until))
    }

    pub(crate) fn departure_cursor(
        &self,
        stop_idx: u32,
        from: Instant,
        until: Instant,
    ) -> DepartureCursor {
        DepartureCursor::new(self, stop_idx, from, until)
    }

    pub(crate) fn departure_table(&self, stop_idx: u32) -> &[DepartureEntry] {
        &self.stop_departures[stop_idx as usize]
    }

    /// Autocomplete over stop names: case-insensitive prefix matching.
    pub fn search_stops_by_name<'a>(&'a self, needle: &'a str) -> Vec<&'a Stop> {
        shared::search(needle, &self.stops)
    }
}

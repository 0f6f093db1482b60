use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    config::{Config, TransferMode},
    gtfs::{self, Gtfs},
    repository::{
        DepartureEntry, Error, Repository, Route, RouteKind, Service, Slice, Stop, StopTime,
        Transfer, Trip,
    },
    shared::time::{Duration, Time, parse_service_day},
};

impl Repository {
    /// Builds the repository from a GTFS bundle. Any malformed value,
    /// dangling reference or unsupported structural feature aborts the load
    /// with the first error encountered.
    pub fn load_gtfs(mut self, mut gtfs: Gtfs, config: &Config) -> Result<Self, Error> {
        self.load_stops(&mut gtfs, config)?;
        self.load_routes(&mut gtfs)?;
        self.load_services(&mut gtfs)?;
        self.load_trips(&mut gtfs)?;
        self.load_stop_times(&mut gtfs)?;
        self.load_transfers(&mut gtfs, config)?;
        self.build_departure_tables();
        Ok(self)
    }

    fn load_stops(&mut self, gtfs: &mut Gtfs, config: &Config) -> Result<(), Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        let node_column = config.transfer_node_id.as_deref();
        if node_column.is_none() && config.transfer_mode == TransferMode::ByNodeId {
            return Err(Error::MissingNodeColumn);
        }

        let mut raw = Vec::new();
        gtfs.stream_stops(|stop| raw.push(stop))?;

        let mut stops: Vec<Stop> = Vec::with_capacity(raw.len());
        let mut stop_lookup: HashMap<Arc<str>, u32> = HashMap::with_capacity(raw.len());
        for (i, stop) in raw.into_iter().enumerate() {
            let node_id = node_column
                .and_then(|column| stop.extra.get(column))
                .filter(|value| !value.is_empty())
                .map(|value| Arc::from(value.as_str()));
            let normalized_name = stop.stop_name.to_lowercase();
            let value = Stop {
                index: i as u32,
                id: stop.stop_id.into(),
                name: stop.stop_name.into(),
                normalized_name: normalized_name.into(),
                parent_station: stop
                    .parent_station
                    .filter(|value| !value.is_empty())
                    .map(Into::into),
                node_id,
            };
            stop_lookup.insert(value.id.clone(), i as u32);
            stops.push(value);
        }
        self.stops = stops.into();
        self.stop_lookup = stop_lookup;
        debug!(
            "Loading {} stops took {:?}",
            self.stops.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn load_routes(&mut self, gtfs: &mut Gtfs) -> Result<(), Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let mut raw = Vec::new();
        gtfs.stream_routes(|route| raw.push(route))?;

        let mut routes: Vec<Route> = Vec::with_capacity(raw.len());
        let mut route_lookup: HashMap<Arc<str>, u32> = HashMap::with_capacity(raw.len());
        for (i, route) in raw.into_iter().enumerate() {
            let kind = RouteKind::from_code(route.route_type).ok_or(Error::UnknownRouteType {
                route: route.route_id.clone(),
                code: route.route_type,
            })?;
            let short_name = route
                .route_short_name
                .filter(|name| !name.is_empty())
                .or(route.route_long_name.filter(|name| !name.is_empty()))
                .ok_or_else(|| Error::UnnamedRoute(route.route_id.clone()))?;
            let value = Route {
                index: i as u32,
                id: route.route_id.into(),
                short_name: short_name.into(),
                kind,
            };
            route_lookup.insert(value.id.clone(), i as u32);
            routes.push(value);
        }
        self.routes = routes.into();
        self.route_lookup = route_lookup;
        debug!(
            "Loading {} routes took {:?}",
            self.routes.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn load_services(&mut self, gtfs: &mut Gtfs) -> Result<(), Error> {
        debug!("Loading services...");
        let now = Instant::now();

        let mut calendar_rows = Vec::new();
        let had_calendar = gtfs.stream_calendar(|row| calendar_rows.push(row))?;

        let mut services: Vec<Service> = Vec::with_capacity(calendar_rows.len());
        let mut service_lookup: HashMap<Arc<str>, u32> =
            HashMap::with_capacity(calendar_rows.len());
        for row in calendar_rows {
            let start = parse_service_day(&row.start_date).ok_or_else(|| Error::InvalidDate {
                service: row.service_id.clone(),
                value: row.start_date.clone(),
            })?;
            let end = parse_service_day(&row.end_date).ok_or_else(|| Error::InvalidDate {
                service: row.service_id.clone(),
                value: row.end_date.clone(),
            })?;
            let weekdays = [
                row.monday,
                row.tuesday,
                row.wednesday,
                row.thursday,
                row.friday,
                row.saturday,
                row.sunday,
            ]
            .map(|flag| flag != 0);
            let index = services.len() as u32;
            let id: Arc<str> = row.service_id.into();
            service_lookup.insert(id.clone(), index);
            services.push(Service {
                index,
                id,
                weekdays,
                start,
                end,
                added: HashSet::new(),
                removed: HashSet::new(),
            });
        }

        let mut date_rows = Vec::new();
        let had_dates = gtfs.stream_calendar_dates(|row| date_rows.push(row))?;
        if !had_calendar && !had_dates {
            return Err(Error::Gtfs(gtfs::Error::FileNotFound(
                "calendar.txt".to_string(),
            )));
        }
        for row in date_rows {
            let date = parse_service_day(&row.date).ok_or_else(|| Error::InvalidDate {
                service: row.service_id.clone(),
                value: row.date.clone(),
            })?;
            let index = match service_lookup.get(row.service_id.as_str()) {
                Some(index) => *index,
                None => {
                    let index = services.len() as u32;
                    let id: Arc<str> = row.service_id.clone().into();
                    service_lookup.insert(id.clone(), index);
                    services.push(Service::exceptions_only(index, id));
                    index
                }
            };
            let service = &mut services[index as usize];
            match row.exception_type {
                1 => {
                    service.added.insert(date);
                }
                2 => {
                    service.removed.insert(date);
                }
                other => {
                    return Err(Error::InvalidException {
                        service: row.service_id,
                        value: other,
                    });
                }
            }
        }

        self.services = services.into();
        self.service_lookup = service_lookup;
        debug!(
            "Loading {} services took {:?}",
            self.services.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn load_trips(&mut self, gtfs: &mut Gtfs) -> Result<(), Error> {
        debug!("Loading trips...");
        let now = Instant::now();
        let mut raw = Vec::new();
        gtfs.stream_trips(|trip| raw.push(trip))?;

        let mut trips: Vec<Trip> = Vec::with_capacity(raw.len());
        let mut trip_lookup: HashMap<Arc<str>, u32> = HashMap::with_capacity(raw.len());
        for (i, trip) in raw.into_iter().enumerate() {
            let route_idx =
                *self
                    .route_lookup
                    .get(trip.route_id.as_str())
                    .ok_or_else(|| Error::UnknownRoute {
                        trip: trip.trip_id.clone(),
                        id: trip.route_id.clone(),
                    })?;
            let service_idx = *self.service_lookup.get(trip.service_id.as_str()).ok_or_else(
                || Error::UnknownService {
                    trip: trip.trip_id.clone(),
                    id: trip.service_id.clone(),
                },
            )?;
            let value = Trip {
                index: i as u32,
                id: trip.trip_id.into(),
                route_idx,
                service_idx,
            };
            trip_lookup.insert(value.id.clone(), i as u32);
            trips.push(value);
        }
        self.trips = trips.into();
        self.trip_lookup = trip_lookup;
        debug!(
            "Loading {} trips took {:?}",
            self.trips.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn load_stop_times(&mut self, gtfs: &mut Gtfs) -> Result<(), Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut raw = Vec::new();
        gtfs.stream_stop_times(|stop_time| raw.push(stop_time))?;

        let mut runs: Vec<Vec<StopTime>> = vec![Vec::new(); self.trips.len()];
        for row in raw {
            let trip_idx = *self
                .trip_lookup
                .get(row.trip_id.as_str())
                .ok_or_else(|| Error::UnknownTrip {
                    id: row.trip_id.clone(),
                })?;

            let stop_id = match row.stop_id.as_deref().filter(|value| !value.is_empty()) {
                Some(stop_id) => stop_id,
                None if row.location_id.as_deref().is_some_and(|v| !v.is_empty()) => {
                    return Err(Error::Unsupported(format!(
                        "location_id without stop_id in trip {}",
                        row.trip_id
                    )));
                }
                None => {
                    return Err(Error::Unsupported(format!(
                        "stop_times row without stop_id in trip {}",
                        row.trip_id
                    )));
                }
            };
            let stop_idx = *self
                .stop_lookup
                .get(stop_id)
                .ok_or_else(|| Error::UnknownStop {
                    context: "stop_times",
                    id: stop_id.to_string(),
                })?;

            let arrival_raw = row.arrival_time.as_deref().filter(|value| !value.is_empty());
            let departure_raw = row
                .departure_time
                .as_deref()
                .filter(|value| !value.is_empty());
            if arrival_raw.is_none() && departure_raw.is_none() {
                return Err(if row.timepoint == Some(0) {
                    Error::Unsupported(format!(
                        "timepoint=0 without explicit times in trip {}",
                        row.trip_id
                    ))
                } else {
                    Error::Unsupported(format!(
                        "stop_times row without explicit times in trip {}",
                        row.trip_id
                    ))
                });
            }
            // One-sided rows copy the present value, as vehicles that only
            // pass through publish a single time.
            let arrival_raw = arrival_raw.or(departure_raw).unwrap_or_default();
            let departure_raw = departure_raw.unwrap_or(arrival_raw);
            let parse = |value: &str| {
                Time::from_hms(value).ok_or_else(|| Error::InvalidTime {
                    trip: row.trip_id.clone(),
                    value: value.to_string(),
                })
            };
            let arrival = parse(arrival_raw)?;
            let departure = parse(departure_raw)?;
            if arrival > departure {
                return Err(Error::UnorderedStopTimes {
                    trip: row.trip_id.clone(),
                });
            }

            runs[trip_idx as usize].push(StopTime {
                trip_idx,
                stop_idx,
                sequence: row.stop_sequence,
                arrival,
                departure,
                pickup: row.pickup_type != Some(1),
                dropoff: row.drop_off_type != Some(1),
            });
        }

        runs.par_iter_mut()
            .for_each(|run| run.sort_unstable_by_key(|stop_time| stop_time.sequence));

        for (trip_idx, run) in runs.iter().enumerate() {
            for pair in run.windows(2) {
                if pair[0].sequence == pair[1].sequence || pair[0].departure > pair[1].arrival {
                    return Err(Error::UnorderedStopTimes {
                        trip: self.trips[trip_idx].id.to_string(),
                    });
                }
            }
        }

        let total = runs.iter().map(Vec::len).sum();
        let mut stop_times: Vec<StopTime> = Vec::with_capacity(total);
        let mut slices: Vec<Slice> = Vec::with_capacity(runs.len());
        for run in runs {
            slices.push(Slice {
                start_idx: stop_times.len() as u32,
                count: run.len() as u32,
            });
            stop_times.extend(run);
        }
        self.stop_times = stop_times.into();
        self.trip_to_stop_slice = slices.into();
        debug!(
            "Loading {} stop times took {:?}",
            self.stop_times.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn load_transfers(&mut self, gtfs: &mut Gtfs, config: &Config) -> Result<(), Error> {
        debug!("Materialising transfers...");
        let now = Instant::now();
        let mut transfers: Vec<Transfer> = Vec::new();

        match config.transfer_mode {
            TransferMode::None => {}
            TransferMode::ByTransfersTxt => {
                let mut raw = Vec::new();
                gtfs.stream_transfers(|transfer| raw.push(transfer))?;
                let mut ignored = 0usize;
                for record in raw {
                    if record.is_qualified() {
                        ignored += 1;
                        continue;
                    }
                    let resolve = |id: &str| {
                        self.stop_lookup
                            .get(id)
                            .copied()
                            .ok_or_else(|| Error::UnknownStop {
                                context: "transfers",
                                id: id.to_string(),
                            })
                    };
                    let recorded = Duration::from_seconds(record.min_transfer_time.unwrap_or(0));
                    transfers.push(Transfer {
                        from_stop_idx: resolve(&record.from_stop_id)?,
                        to_stop_idx: resolve(&record.to_stop_id)?,
                        duration: recorded.max(config.min_transfer_time),
                    });
                }
                if ignored > 0 {
                    warn!("Ignored {ignored} transfers.txt records with trip or route qualifiers");
                }
            }
            TransferMode::ByNodeId | TransferMode::ByParentStation => {
                let mut groups: HashMap<Arc<str>, Vec<u32>> = HashMap::new();
                for stop in &self.stops {
                    let key = match config.transfer_mode {
                        TransferMode::ByNodeId => stop.node_id.clone(),
                        _ => stop.parent_station.clone(),
                    };
                    if let Some(key) = key {
                        groups.entry(key).or_default().push(stop.index);
                    }
                }
                let mut groups: Vec<_> = groups.into_iter().collect();
                groups.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
                for (_, members) in groups {
                    for &from in &members {
                        for &to in &members {
                            if from != to {
                                transfers.push(Transfer {
                                    from_stop_idx: from,
                                    to_stop_idx: to,
                                    duration: config.min_transfer_time,
                                });
                            }
                        }
                    }
                }
            }
        }

        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); self.stops.len()];
        for (i, transfer) in transfers.iter().enumerate() {
            adjacency[transfer.from_stop_idx as usize].push(i as u32);
        }
        // The walking visitor steps through a stop's edges one event at a
        // time; its event instants only stay non-decreasing if the edges are
        // ordered by duration.
        for edges in &mut adjacency {
            edges.sort_unstable_by_key(|&i| {
                let transfer = &transfers[i as usize];
                (transfer.duration, transfer.to_stop_idx)
            });
        }
        self.transfers = transfers.into();
        self.stop_to_transfers = adjacency.into_iter().map(Into::into).collect();
        debug!(
            "Materialising {} transfers took {:?}",
            self.transfers.len(),
            now.elapsed()
        );
        Ok(())
    }

    fn build_departure_tables(&mut self) {
        debug!("Building departure tables...");
        let now = Instant::now();
        let mut tables: Vec<Vec<DepartureEntry>> = vec![Vec::new(); self.stops.len()];
        for trip_idx in 0..self.trips.len() as u32 {
            for (pos, stop_time) in self.stop_times_of(trip_idx).iter().enumerate() {
                if stop_time.pickup {
                    tables[stop_time.stop_idx as usize].push(DepartureEntry {
                        departure: stop_time.departure,
                        trip_idx,
                        pos: pos as u32,
                    });
                }
            }
        }
        tables.par_iter_mut().for_each(|table| {
            table.sort_unstable_by_key(|entry| (entry.departure, entry.trip_idx, entry.pos));
        });
        self.stop_departures = tables.into_iter().map(Into::into).collect();
        debug!("Building departure tables took {:?}", now.elapsed());
    }
}

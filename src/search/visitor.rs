use crate::{
    repository::{DepartureCursor, Repository, ScheduledDeparture},
    search::{
        journey::{Prefix, Segment},
        quality::ConnectionQuality,
    },
    shared::time::Instant,
};

/// Which best-known table a proposal competes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Stop(u32),
    Trip(u32),
}

/// A candidate improvement produced by one visitor step. The attached
/// visitors enter the frontier only when the driver accepts the proposal.
pub(crate) struct Proposal {
    pub slot: Slot,
    pub quality: ConnectionQuality,
    pub prefix: Prefix,
    pub emits: Vec<Visitor>,
}

/// Result of advancing a visitor by exactly one event.
pub(crate) struct Step {
    pub proposal: Option<Proposal>,
    pub requeue: Option<Visitor>,
}

/// A frontier position of the search: standing at a stop, riding a trip, or
/// walking transfers. Closed set of variants with explicit dispatch; every
/// variant carries repository handles plus its prefix journey, never
/// references into the dataset.
#[derive(Debug, Clone)]
pub(crate) enum Visitor {
    Stop(StopVisitor),
    Trip(TripVisitor),
    Transfer(TransferVisitor),
}

impl Visitor {
    /// The absolute instant of this visitor's next action; `None` once it is
    /// exhausted.
    pub fn next_event(&self, repository: &Repository) -> Option<Instant> {
        match self {
            Visitor::Stop(v) => v.next_event(),
            Visitor::Trip(v) => v.next_event(repository),
            Visitor::Transfer(v) => v.next_event(repository),
        }
    }

    pub fn step(self, repository: &Repository) -> Step {
        match self {
            Visitor::Stop(v) => v.step(repository),
            Visitor::Trip(v) => v.step(repository),
            Visitor::Transfer(v) => v.step(repository),
        }
    }
}

/// Standing at a stop having arrived via `prefix`, ready to board the next
/// departure not yet considered.
#[derive(Debug, Clone)]
pub(crate) struct StopVisitor {
    stop_idx: u32,
    pending: Option<ScheduledDeparture>,
    cursor: DepartureCursor,
    until: Instant,
    prefix: Prefix,
}

impl StopVisitor {
    pub fn new(
        repository: &Repository,
        stop_idx: u32,
        arrival: Instant,
        until: Instant,
        prefix: Prefix,
    ) -> Self {
        let mut cursor = repository.departure_cursor(stop_idx, arrival, until);
        let pending = cursor.next(repository);
        Self {
            stop_idx,
            pending,
            cursor,
            until,
            prefix,
        }
    }

    fn next_event(&self) -> Option<Instant> {
        self.pending.map(|departure| departure.at)
    }

    /// Boards the departure under the cursor, proposing it against the
    /// boarded trip's best-known prefix, and keeps waiting for the one
    /// after.
    fn step(mut self, repository: &Repository) -> Step {
        let Some(departure) = self.pending.take() else {
            return Step {
                proposal: None,
                requeue: None,
            };
        };

        let quality = ConnectionQuality {
            arrival: departure.at,
            departure: self.prefix.departure().unwrap_or(departure.at),
            rides: self.prefix.rides() + 1,
        };
        let rider = TripVisitor::new(
            repository,
            departure,
            self.stop_idx,
            self.until,
            self.prefix.clone(),
        );
        let proposal = Proposal {
            slot: Slot::Trip(departure.trip_idx),
            quality,
            prefix: self.prefix.clone(),
            emits: vec![Visitor::Trip(rider)],
        };

        self.pending = self.cursor.next(repository);
        Step {
            proposal: Some(proposal),
            requeue: Some(Visitor::Stop(self)),
        }
    }
}

/// Riding a trip; the prefix journey is committed up to the boarding stop,
/// the ride segment stays open until alighting.
#[derive(Debug, Clone)]
pub(crate) struct TripVisitor {
    trip_idx: u32,
    board_stop_idx: u32,
    board_at: Instant,
    /// Midnight of the service day the trip operates on; converts the trip's
    /// relative stop times to absolute instants.
    midnight: Instant,
    /// Position of the stop time the vehicle last left.
    pos: u32,
    until: Instant,
    prefix: Prefix,
}

impl TripVisitor {
    fn new(
        repository: &Repository,
        boarded: ScheduledDeparture,
        board_stop_idx: u32,
        until: Instant,
        prefix: Prefix,
    ) -> Self {
        let departure = repository
            .stop_time_at(boarded.trip_idx, boarded.pos)
            .map(|stop_time| stop_time.departure)
            .unwrap_or_default();
        Self {
            trip_idx: boarded.trip_idx,
            board_stop_idx,
            board_at: boarded.at,
            midnight: boarded.at - departure,
            pos: boarded.pos,
            until,
            prefix,
        }
    }

    fn next_event(&self, repository: &Repository) -> Option<Instant> {
        let next = repository.stop_time_at(self.trip_idx, self.pos + 1)?;
        Some(self.midnight + next.arrival)
    }

    /// Rides to the next stop time and proposes alighting there; continues
    /// riding either way.
    fn step(mut self, repository: &Repository) -> Step {
        let Some(stop_time) = repository.stop_time_at(self.trip_idx, self.pos + 1).copied() else {
            return Step {
                proposal: None,
                requeue: None,
            };
        };
        self.pos += 1;
        let arrival = self.midnight + stop_time.arrival;

        let proposal = stop_time.dropoff.then(|| {
            let journey = self.prefix.extend(Segment::Ride {
                trip_idx: self.trip_idx,
                board_stop_idx: self.board_stop_idx,
                alight_stop_idx: stop_time.stop_idx,
                departure: self.board_at,
                arrival,
            });
            let emits = vec![
                Visitor::Stop(StopVisitor::new(
                    repository,
                    stop_time.stop_idx,
                    arrival,
                    self.until,
                    journey.clone(),
                )),
                Visitor::Transfer(TransferVisitor::new(
                    stop_time.stop_idx,
                    arrival,
                    self.until,
                    journey.clone(),
                )),
            ];
            Proposal {
                slot: Slot::Stop(stop_time.stop_idx),
                quality: journey.quality_at(arrival),
                prefix: journey,
                emits,
            }
        });

        Step {
            proposal,
            requeue: Some(Visitor::Trip(self)),
        }
    }
}

/// Walking from a stop to the stops reachable over its transfer edges, one
/// edge per event.
#[derive(Debug, Clone)]
pub(crate) struct TransferVisitor {
    stop_idx: u32,
    arrival: Instant,
    edge: u32,
    until: Instant,
    prefix: Prefix,
}

impl TransferVisitor {
    pub fn new(stop_idx: u32, arrival: Instant, until: Instant, prefix: Prefix) -> Self {
        Self {
            stop_idx,
            arrival,
            edge: 0,
            until,
            prefix,
        }
    }

    fn next_event(&self, repository: &Repository) -> Option<Instant> {
        let transfer = repository.transfer_edge(self.stop_idx, self.edge)?;
        Some(self.arrival + transfer.duration)
    }

    /// Walks the current edge and proposes the arrival at its target, then
    /// moves on to the next edge.
    fn step(mut self, repository: &Repository) -> Step {
        let Some(transfer) = repository.transfer_edge(self.stop_idx, self.edge) else {
            return Step {
                proposal: None,
                requeue: None,
            };
        };
        self.edge += 1;
        let arrival = self.arrival + transfer.duration;

        let journey = self.prefix.extend(Segment::Walk {
            from_stop_idx: self.stop_idx,
            to_stop_idx: transfer.to_stop_idx,
            departure: self.arrival,
            arrival,
        });
        let emits = vec![Visitor::Stop(StopVisitor::new(
            repository,
            transfer.to_stop_idx,
            arrival,
            self.until,
            journey.clone(),
        ))];
        let proposal = Proposal {
            slot: Slot::Stop(transfer.to_stop_idx),
            quality: journey.quality_at(arrival),
            prefix: journey,
            emits,
        };

        Step {
            proposal: Some(proposal),
            requeue: Some(Visitor::Transfer(self)),
        }
    }
}

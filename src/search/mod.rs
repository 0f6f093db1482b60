mod journey;
mod profile;
mod quality;
mod visitor;

pub use journey::{Journey, Segment};
pub use quality::ConnectionQuality;

use std::{cmp::Ordering, collections::BinaryHeap};

use thiserror::Error;

use crate::{
    repository::Repository,
    search::{
        journey::Prefix,
        profile::Profile,
        visitor::{Slot, StopVisitor, TransferVisitor, Visitor},
    },
    shared::time::{Duration, Instant},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("origin stop id does not match any entry: {0}")]
    UnknownOrigin(String),
    #[error("destination stop id does not match any entry: {0}")]
    UnknownDestination(String),
}

/// Result of a solved query. Finding nothing is an answer, not an error.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The optimal journey under the quality order.
    Connection(Journey),
    /// Every reachable journey arrives after the horizon.
    NotFoundWithinHorizon,
    /// Origin and destination are the same stop.
    OriginEqualsDestination,
}

/// An earliest-arrival search between two stops.
///
/// Holds the query parameters and a reference to the immutable
/// [`Repository`]. Designed to be short-lived, typically created via
/// [`Repository::connection`]; all search state lives inside `solve` and is
/// dropped with it.
pub struct Search<'a> {
    repository: &'a Repository,
    origin: String,
    destination: String,
    departure: Instant,
    horizon: Duration,
    profile: bool,
}

impl<'a> Search<'a> {
    pub(crate) fn new(repository: &'a Repository, origin: &str, destination: &str) -> Self {
        Self {
            repository,
            origin: origin.to_string(),
            destination: destination.to_string(),
            departure: Instant::from_datetime(chrono::Local::now().naive_local()),
            horizon: Duration::from_hours(24),
            profile: false,
        }
    }

    /// Sets the earliest instant the journey can begin. Defaults to now.
    pub fn departing_at(mut self, departure: Instant) -> Self {
        self.departure = departure;
        self
    }

    /// Sets the search horizon: journeys arriving after `departure +
    /// horizon` are not considered. Defaults to 24 h; correctness is not
    /// guaranteed for larger horizons.
    pub fn within(mut self, horizon: Duration) -> Self {
        self.horizon = horizon;
        self
    }

    /// Enables per-query profiling counters, reported through `tracing`.
    pub fn profiled(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// Runs the event loop to completion and returns the outcome.
    ///
    /// Visitors are popped from a min-heap keyed by their next event
    /// instant. Because a visitor can only produce journeys arriving at or
    /// after its event, the first recorded journey at the destination is
    /// final as soon as the heap front has moved strictly past its arrival.
    pub fn solve(self) -> Result<SearchOutcome, Error> {
        if self.origin == self.destination {
            return Ok(SearchOutcome::OriginEqualsDestination);
        }
        let origin = self
            .repository
            .stop_by_id(&self.origin)
            .ok_or_else(|| Error::UnknownOrigin(self.origin.clone()))?
            .index;
        let destination = self
            .repository
            .stop_by_id(&self.destination)
            .ok_or_else(|| Error::UnknownDestination(self.destination.clone()))?
            .index;

        let deadline = self.departure + self.horizon;
        let mut profile = self.profile.then(Profile::new);

        let mut best_at_stop: Vec<Option<ConnectionQuality>> =
            vec![None; self.repository.stops.len()];
        let mut best_at_trip: Vec<Option<ConnectionQuality>> =
            vec![None; self.repository.trips.len()];
        let mut best_journey: Option<Prefix> = None;

        let mut heap: BinaryHeap<Frontier> = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut push = |heap: &mut BinaryHeap<Frontier>,
                        profile: &mut Option<Profile>,
                        visitor: Visitor| {
            if let Some(at) = visitor.next_event(self.repository)
                && at <= deadline
            {
                seq += 1;
                heap.push(Frontier {
                    at,
                    seq,
                    visitor,
                });
                if let Some(profile) = profile {
                    profile.enqueued();
                }
            }
        };

        push(
            &mut heap,
            &mut profile,
            Visitor::Stop(StopVisitor::new(
                self.repository,
                origin,
                self.departure,
                deadline,
                Prefix::empty(),
            )),
        );
        push(
            &mut heap,
            &mut profile,
            Visitor::Transfer(TransferVisitor::new(
                origin,
                self.departure,
                deadline,
                Prefix::empty(),
            )),
        );

        let mut last_popped = self.departure;
        let outcome = loop {
            // Visitors past the deadline are dropped on push, so an empty
            // heap means the horizon is exhausted.
            let Some(frontier) = heap.pop() else {
                break match &best_journey {
                    Some(prefix) => SearchOutcome::Connection(prefix.to_journey()),
                    None => SearchOutcome::NotFoundWithinHorizon,
                };
            };
            debug_assert!(frontier.at >= last_popped, "frontier went backwards");
            last_popped = frontier.at;

            // Once the heap front moves strictly past the recorded arrival,
            // no remaining visitor can reach the destination earlier or tie
            // with a better quality.
            if let Some(best) = &best_at_stop[destination as usize]
                && best.arrival < frontier.at
                && let Some(prefix) = &best_journey
            {
                break SearchOutcome::Connection(prefix.to_journey());
            }

            if let Some(profile) = &mut profile {
                profile.popped(&frontier.visitor);
            }

            let step = frontier.visitor.step(self.repository);
            if let Some(proposal) = step.proposal {
                if let Some(profile) = &mut profile {
                    profile.proposed();
                }
                let best = match proposal.slot {
                    Slot::Stop(stop_idx) => &mut best_at_stop[stop_idx as usize],
                    Slot::Trip(trip_idx) => &mut best_at_trip[trip_idx as usize],
                };
                if proposal.quality.improves(best.as_ref()) {
                    *best = Some(proposal.quality);
                    if proposal.slot == Slot::Stop(destination) {
                        best_journey = Some(proposal.prefix.clone());
                    }
                    if let Some(profile) = &mut profile {
                        profile.improved();
                    }
                    for visitor in proposal.emits {
                        push(&mut heap, &mut profile, visitor);
                    }
                }
            }
            if let Some(visitor) = step.requeue {
                push(&mut heap, &mut profile, visitor);
            }
        };

        if let Some(profile) = &profile {
            profile.report(match &outcome {
                SearchOutcome::Connection(_) => "connection",
                SearchOutcome::NotFoundWithinHorizon => "not found",
                SearchOutcome::OriginEqualsDestination => "self query",
            });
        }
        Ok(outcome)
    }
}

/// Heap entry keyed by the visitor's next event; the earliest event is the
/// greatest so the `BinaryHeap` pops it first, with insertion order breaking
/// ties.
struct Frontier {
    at: Instant,
    seq: u64,
    visitor: Visitor,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .reverse()
            .then_with(|| self.seq.cmp(&other.seq).reverse())
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

use std::time::Instant;

use tracing::debug;

use crate::search::visitor::Visitor;

/// Per-query counters for the search loop, reported through `tracing` when
/// profiling is enabled.
#[derive(Debug)]
pub(crate) struct Profile {
    started: Instant,
    stop_events: u64,
    trip_events: u64,
    transfer_events: u64,
    proposals: u64,
    improvements: u64,
    pushed: u64,
}

impl Profile {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stop_events: 0,
            trip_events: 0,
            transfer_events: 0,
            proposals: 0,
            improvements: 0,
            pushed: 0,
        }
    }

    pub fn popped(&mut self, visitor: &Visitor) {
        match visitor {
            Visitor::Stop(_) => self.stop_events += 1,
            Visitor::Trip(_) => self.trip_events += 1,
            Visitor::Transfer(_) => self.transfer_events += 1,
        }
    }

    pub fn proposed(&mut self) {
        self.proposals += 1;
    }

    pub fn improved(&mut self) {
        self.improvements += 1;
    }

    pub fn enqueued(&mut self) {
        self.pushed += 1;
    }

    pub fn report(&self, outcome: &str) {
        let popped = self.stop_events + self.trip_events + self.transfer_events;
        debug!(
            "Search finished ({outcome}): {popped} events popped ({} stop, {} trip, {} transfer), \
             {} proposals, {} improvements, {} visitors enqueued, took {:?}",
            self.stop_events,
            self.trip_events,
            self.transfer_events,
            self.proposals,
            self.improvements,
            self.pushed,
            self.started.elapsed()
        );
    }
}

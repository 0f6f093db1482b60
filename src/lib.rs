//! Pendler answers earliest-arrival journey queries over a public-transit
//! schedule: given an origin stop, a destination stop and a departure
//! instant, it returns one optimal journey of vehicle legs and walking
//! transfers, or reports that none exists within the search horizon.
//!
//! The [`repository`] holds the immutable, indexed schedule built from a
//! GTFS bundle via [`gtfs`]; [`search`] runs the event-driven exploration on
//! top of it. Everything is in memory after the load phase and queries are
//! plain synchronous calls:
//!
//! ```no_run
//! use pendler::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new("data/gtfs");
//! let gtfs = Gtfs::new().from_directory(&config.dataset_path);
//! let repository = Repository::new().load_gtfs(gtfs, &config)?;
//!
//! let outcome = repository
//!     .connection("stop-a", "stop-b")
//!     .within(config.max_search_time)
//!     .solve()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gtfs;
pub mod repository;
pub mod search;
pub mod shared;

pub mod prelude {
    pub use crate::config::{Config, TransferMode};
    pub use crate::gtfs::Gtfs;
    pub use crate::repository::Repository;
    pub use crate::search::{Journey, SearchOutcome, Segment};
    pub use crate::shared::time::{Duration, Instant, Time};
}

pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod governor;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod server;
pub mod source;
pub mod timestamp;
pub mod types;

pub use collector::{Collector, CycleOutcome};
pub use error::{ExporterError, Result};
pub use poller::PollLoop;
pub use source::{MetadataClient, SnapshotSource};
pub use types::{Event, Snapshot};

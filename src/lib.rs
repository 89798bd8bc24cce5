//! iliad-sensor: Iliad account figures as home-automation sensors
//!
//! Pipeline:
//! - fetch: log in and download the account summary page
//! - extract: scrape balance, data usage and remaining data
//! - coordinator: cache the last good reading, one refresh at a time
//! - sensor: read-only views over the cached reading

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod schema;
pub mod sensor;

pub use config::{Credentials, Endpoints, FetchConfig, PollInterval};
pub use coordinator::{Coordinator, Refreshable};
pub use error::FetchError;
pub use extract::parse;
pub use fetch::{PageSource, SessionFetcher};
pub use schema::{FailureKind, Reading, RefreshState};
pub use sensor::{sensors, Readable, Sensor, SensorKind, SensorState};

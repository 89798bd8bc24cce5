//! Sensors exposed to the host entity registry
//!
//! Three read-only views over the coordinator's cached reading. They hold a
//! watch receiver, so they never poll: the value changes when the coordinator
//! publishes a new reading.

use crate::schema::{Reading, RefreshState};
use serde::Serialize;
use tokio::sync::watch;

/// Capability the host entity registry depends on
pub trait Readable: Send + Sync {
    fn name(&self) -> &'static str;
    fn current_value(&self) -> Option<String>;
    fn unit(&self) -> Option<String>;
    fn icon(&self) -> &'static str;

    /// Updates are pushed by the coordinator
    fn should_poll(&self) -> bool {
        false
    }

    fn snapshot(&self) -> SensorState {
        SensorState {
            name: self.name(),
            state: self.current_value(),
            unit: self.unit(),
            icon: self.icon(),
        }
    }
}

/// Point-in-time view of one sensor, as reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    pub name: &'static str,
    pub state: Option<String>,
    pub unit: Option<String>,
    pub icon: &'static str,
}

/// Which figure of the reading a sensor projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Balance,
    DataUsage,
    RemainingData,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Balance,
        SensorKind::DataUsage,
        SensorKind::RemainingData,
    ];

    fn name(self) -> &'static str {
        match self {
            SensorKind::Balance => "Iliad Balance",
            SensorKind::DataUsage => "Iliad Data Usage",
            SensorKind::RemainingData => "Iliad Remaining Data",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            SensorKind::Balance => "mdi:currency-eur",
            SensorKind::DataUsage => "mdi:progress-download",
            SensorKind::RemainingData => "mdi:progress-check",
        }
    }

    fn value(self, reading: &Reading) -> Option<String> {
        match self {
            SensorKind::Balance => reading.balance.clone(),
            SensorKind::DataUsage => reading.data_usage.clone(),
            SensorKind::RemainingData => reading.remaining_data.clone(),
        }
    }

    fn unit(self, reading: &Reading) -> Option<String> {
        match self {
            SensorKind::Balance => Some("EUR".to_string()),
            SensorKind::DataUsage => reading.data_usage_unit.clone(),
            SensorKind::RemainingData => reading.remaining_data_unit.clone(),
        }
    }

    /// Name, value, unit and icon, all taken from the same reading
    pub fn project(self, reading: &Reading) -> SensorState {
        SensorState {
            name: self.name(),
            state: self.value(reading),
            unit: self.unit(reading),
            icon: self.icon(),
        }
    }
}

/// One sensor bound to the coordinator's published state
pub struct Sensor {
    kind: SensorKind,
    state: watch::Receiver<RefreshState>,
}

impl Sensor {
    pub fn new(kind: SensorKind, state: watch::Receiver<RefreshState>) -> Self {
        Self { kind, state }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }
}

impl Readable for Sensor {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn current_value(&self) -> Option<String> {
        self.kind.value(&self.state.borrow().reading)
    }

    fn unit(&self) -> Option<String> {
        self.kind.unit(&self.state.borrow().reading)
    }

    fn icon(&self) -> &'static str {
        self.kind.icon()
    }

    fn snapshot(&self) -> SensorState {
        // One borrow: value and unit must come from the same reading
        let reading = self.state.borrow().reading.clone();
        self.kind.project(&reading)
    }
}

/// Balance, data usage and remaining data sensors, in registration order
pub fn sensors(state: &watch::Receiver<RefreshState>) -> Vec<Sensor> {
    SensorKind::ALL
        .into_iter()
        .map(|kind| Sensor::new(kind, state.clone()))
        .collect()
}

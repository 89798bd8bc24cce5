//! Account reading data model
//!
//! A `Reading` is one snapshot of the figures scraped from the account page.
//! Every field is optional: a missing field is an extraction gap, not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Figures extracted from one successful fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reading {
    /// Credit balance in EUR, decimal separator kept as published
    pub balance: Option<String>,
    /// Data consumed in the current period (comma normalized to period)
    pub data_usage: Option<String>,
    /// One of KB/MB/GB/TB, case preserved
    pub data_usage_unit: Option<String>,
    /// Data left in the current period (comma normalized to period)
    pub remaining_data: Option<String>,
    /// Free-text unit label next to the remaining amount
    pub remaining_data_unit: Option<String>,
}

impl Reading {
    /// True when nothing could be extracted
    pub fn is_empty(&self) -> bool {
        self.balance.is_none()
            && self.data_usage.is_none()
            && self.data_usage_unit.is_none()
            && self.remaining_data.is_none()
            && self.remaining_data_unit.is_none()
    }
}

/// Why a refresh cycle failed to produce a new reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Login did not return 200
    Auth,
    /// Account page did not return 200
    Retrieval,
    /// Timeout, DNS, connection reset, ...
    Transport,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Auth => write!(f, "auth"),
            FailureKind::Retrieval => write!(f, "retrieval"),
            FailureKind::Transport => write!(f, "transport"),
        }
    }
}

/// Value published by the coordinator on every cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshState {
    pub reading: Arc<Reading>,
    /// Time of the last successful fetch (null if never)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Failure of the most recent cycle, cleared on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<FailureKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reading_is_empty() {
        assert!(Reading::default().is_empty());

        let reading = Reading {
            remaining_data_unit: Some("GB".to_string()),
            ..Reading::default()
        };
        assert!(!reading.is_empty());
    }

    #[test]
    fn test_failure_kind_serializes_lowercase() {
        let json = serde_json::to_string(&FailureKind::Auth).unwrap();
        assert_eq!(json, "\"auth\"");
        assert_eq!(FailureKind::Transport.to_string(), "transport");
    }

    #[test]
    fn test_refresh_state_skips_empty_fields() {
        let json = serde_json::to_value(RefreshState::default()).unwrap();
        assert!(json.get("refreshed_at").is_none());
        assert!(json.get("last_failure").is_none());
        assert!(json["reading"]["balance"].is_null());
    }
}

// src/models/dispatch.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::trip::TripStatus;
use crate::utils::serde_helpers::{opt_f64_lenient, opt_timestamp_lenient};

/// A time-limited offer of a trip to this driver.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingDispatch {
    #[serde(alias = "dispatch_id")]
    pub attempt_id: i64,
    pub trip_id: i64,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub pickup_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub pickup_lng: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub drop_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub drop_lng: Option<f64>,
    #[serde(default)]
    pub rider_name: Option<String>, // Masked, e.g. "Likhitha M."
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub estimated_distance_km: Option<f64>,
    #[serde(default, deserialize_with = "opt_timestamp_lenient")]
    pub sent_at: Option<DateTime<Utc>>,
    // Absent means already expired.
    #[serde(default)]
    pub expires_in_seconds: i64,
}

impl PendingDispatch {
    /// The list is not pruned locally; expired offers disappear on the next poll.
    pub fn is_expired(&self) -> bool {
        self.expires_in_seconds <= 0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PendingDispatchList {
    #[serde(default)]
    pub pending_dispatches: Vec<PendingDispatch>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchAcceptance {
    #[serde(default)]
    pub message: Option<String>,
    pub trip_id: i64,
    pub status: TripStatus,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub fare_amount: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchRejection {
    #[serde(default)]
    pub message: Option<String>,
    pub attempt_id: i64,
}

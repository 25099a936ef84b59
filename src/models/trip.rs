// src/models/trip.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::serde_helpers::{opt_f64_lenient, opt_timestamp_lenient};

/// Trip status as reported by the backend.
///
/// The client never validates transitions; it only branches on whatever the
/// last poll returned. Strings the client does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TripStatus {
    Requested,     // Trip created, dispatch not started yet
    Dispatching,   // Offers are being sent to nearby drivers
    Assigned,      // A driver accepted the offer
    DriverEnRoute, // Driver heading to pickup
    Arrived,       // Driver at pickup, waiting for OTP
    PickedUp,      // Rider on board
    InProgress,    // Trip under way
    Completed,
    Cancelled,
    Failed, // No driver found
    Other(String),
}

impl TripStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "REQUESTED" => TripStatus::Requested,
            "DISPATCHING" => TripStatus::Dispatching,
            "ASSIGNED" => TripStatus::Assigned,
            "DRIVER_EN_ROUTE" => TripStatus::DriverEnRoute,
            "ARRIVED" => TripStatus::Arrived,
            "PICKED_UP" => TripStatus::PickedUp,
            // ON_TRIP is what the older driver screens were sent
            "IN_PROGRESS" | "ON_TRIP" => TripStatus::InProgress,
            "COMPLETED" => TripStatus::Completed,
            "CANCELLED" => TripStatus::Cancelled,
            "FAILED" => TripStatus::Failed,
            _ => TripStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TripStatus::Requested => "REQUESTED",
            TripStatus::Dispatching => "DISPATCHING",
            TripStatus::Assigned => "ASSIGNED",
            TripStatus::DriverEnRoute => "DRIVER_EN_ROUTE",
            TripStatus::Arrived => "ARRIVED",
            TripStatus::PickedUp => "PICKED_UP",
            TripStatus::InProgress => "IN_PROGRESS",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
            TripStatus::Failed => "FAILED",
            TripStatus::Other(raw) => raw,
        }
    }

    /// No further transitions happen after these.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TripStatus::Completed | TripStatus::Cancelled | TripStatus::Failed
        )
    }

    /// Statuses during which the assigned driver is shown to the rider.
    pub fn has_driver(&self) -> bool {
        matches!(
            self,
            TripStatus::Assigned
                | TripStatus::DriverEnRoute
                | TripStatus::Arrived
                | TripStatus::PickedUp
                | TripStatus::InProgress
        )
    }
}

impl From<String> for TripStatus {
    fn from(raw: String) -> Self {
        TripStatus::parse(&raw)
    }
}

impl From<TripStatus> for String {
    fn from(status: TripStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleCategory {
    Bike,
    Auto,
    Sedan,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [VehicleCategory::Bike, VehicleCategory::Auto, VehicleCategory::Sedan];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Bike => "BIKE",
            VehicleCategory::Auto => "AUTO",
            VehicleCategory::Sedan => "SEDAN",
        }
    }
}

impl std::str::FromStr for VehicleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BIKE" => Ok(VehicleCategory::Bike),
            "AUTO" => Ok(VehicleCategory::Auto),
            "SEDAN" => Ok(VehicleCategory::Sedan),
            other => Err(format!("unknown vehicle category: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DriverSummary {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VehicleSummary {
    #[serde(default)]
    pub vehicle_category: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
}

/// Rider-side view of a trip. Every field except id and status is optional
/// because different endpoints return different subsets.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    pub trip_id: i64,
    pub status: TripStatus,
    #[serde(default)]
    pub driver_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub fare_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub estimated_fare: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub pickup_location: Option<Coordinates>,
    #[serde(default)]
    pub drop_location: Option<Coordinates>,
    #[serde(default)]
    pub pickup_otp: Option<String>,
    #[serde(default)]
    pub driver: Option<DriverSummary>,
    #[serde(default)]
    pub vehicle: Option<VehicleSummary>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl Trip {
    /// Final fare if known, otherwise the estimate.
    pub fn display_fare(&self) -> Option<f64> {
        self.fare_amount.or(self.estimated_fare)
    }
}

/// Driver-side active trip from `/dispatch/driver/trips/active`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActiveTrip {
    pub trip_id: i64,
    pub status: TripStatus,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub pickup_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub pickup_lng: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub drop_lat: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub drop_lng: Option<f64>,
    #[serde(default)]
    pub rider_name: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub fare_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_timestamp_lenient")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "opt_timestamp_lenient")]
    pub picked_up_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActiveTripEnvelope<T> {
    // A missing key already decodes to None.
    pub active_trip: Option<T>,
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TripLocations {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub drop_lat: f64,
    pub drop_lng: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TripRequest {
    #[serde(flatten)]
    pub locations: TripLocations,
    pub vehicle_category: VehicleCategory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocationValidation {
    pub city_id: i64,
    pub city_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FareEstimate {
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub distance_km: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub base_fare: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub surge_multiplier: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub final_fare: Option<f64>,
    #[serde(default)]
    pub surge_zone_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryEstimate {
    pub category: VehicleCategory,
    #[serde(flatten)]
    pub estimate: FareEstimate,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreatedTrip {
    pub trip_id: i64,
    pub status: TripStatus,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub fare_amount: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CancelledTrip {
    pub trip_id: i64,
    pub status: TripStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PickupOtp {
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub pickup_otp: Option<String>,
}

impl PickupOtp {
    pub fn code(&self) -> Option<&str> {
        self.otp.as_deref().or(self.pickup_otp.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtpSubmission {
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OtpVerification {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Body returned by driver trip transitions (arrive, pickup, complete).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TripTransition {
    #[serde(default)]
    pub message: Option<String>,
    pub trip_id: i64,
    pub status: TripStatus,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub fare_amount: Option<f64>,
}

// src/models/driver.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::serde_helpers::opt_timestamp_lenient;

/// Approval lifecycle shared by driver and fleet-owner capabilities.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl From<String> for ApprovalStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => ApprovalStatus::Pending,
            "APPROVED" => ApprovalStatus::Approved,
            "REJECTED" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Other(raw),
        }
    }
}

impl From<ApprovalStatus> for String {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => "PENDING".to_string(),
            ApprovalStatus::Approved => "APPROVED".to_string(),
            ApprovalStatus::Rejected => "REJECTED".to_string(),
            ApprovalStatus::Other(raw) => raw,
        }
    }
}

/// Driver availability as the backend reports it. All transitions are
/// validated server side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ShiftStatus {
    Online,  // Available for dispatches
    Busy,    // On a trip
    Offline, // Not working
    Other(String),
}

impl ShiftStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ShiftStatus::Online => "ONLINE",
            ShiftStatus::Busy => "BUSY",
            ShiftStatus::Offline => "OFFLINE",
            ShiftStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ShiftStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => ShiftStatus::Online,
            "BUSY" => ShiftStatus::Busy,
            "OFFLINE" => ShiftStatus::Offline,
            _ => ShiftStatus::Other(raw),
        }
    }
}

impl From<ShiftStatus> for String {
    fn from(status: ShiftStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriverProfile {
    pub driver_id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
}

impl DriverProfile {
    pub fn is_approved(&self) -> bool {
        self.approval_status == Some(ApprovalStatus::Approved)
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Driver")
    }
}

/// Shift record as returned by start/end shift.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shift {
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default = "offline")]
    pub status: ShiftStatus,
    #[serde(default, deserialize_with = "opt_timestamp_lenient")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vehicle_registration: Option<String>,
    #[serde(default)]
    pub fleet_name: Option<String>,
}

fn offline() -> ShiftStatus {
    ShiftStatus::Offline
}

/// Body of the active-shift lookup. Always 200; a driver without a shift
/// gets `shift_status: null`, one who went offline may get the ended shift.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ShiftStatusResponse {
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default)]
    pub shift_status: Option<ShiftStatus>,
    #[serde(default)]
    pub vehicle_registration: Option<String>,
    #[serde(default)]
    pub fleet_name: Option<String>,
    #[serde(default, deserialize_with = "opt_timestamp_lenient")]
    pub started_at: Option<DateTime<Utc>>,
}

impl ShiftStatusResponse {
    /// The running shift, if any. An OFFLINE shift is not running.
    pub fn into_shift(self) -> Option<Shift> {
        let status = self.shift_status.filter(|status| *status != ShiftStatus::Offline)?;
        Some(Shift {
            shift_id: self.shift_id,
            status,
            started_at: self.started_at,
            vehicle_registration: self.vehicle_registration,
            fleet_name: self.fleet_name,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct VehicleAssignmentCheck {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub is_vehicle_approved: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReadinessChecks {
    #[serde(default)]
    pub vehicle_assignment: Option<VehicleAssignmentCheck>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ShiftReadiness {
    #[serde(default)]
    pub can_go_online: Option<bool>,
    #[serde(default)]
    pub checks: ReadinessChecks,
}

impl ShiftReadiness {
    pub fn has_vehicle_assignment(&self) -> bool {
        self.checks
            .vehicle_assignment
            .as_ref()
            .is_some_and(|v| v.exists)
    }

    pub fn is_vehicle_approved(&self) -> bool {
        self.checks
            .vehicle_assignment
            .as_ref()
            .is_some_and(|v| v.is_vehicle_approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_shift() {
        let started: Shift =
            serde_json::from_str(r#"{"shift_id": 3, "status": "ONLINE", "started_at": "2025-01-02T08:00:00"}"#)
                .unwrap();
        assert_eq!(started.status, ShiftStatus::Online);
        assert!(started.started_at.is_some());
    }

    #[test]
    fn test_shift_status_lookup() {
        let active: ShiftStatusResponse = serde_json::from_str(
            r#"{"is_online": true, "shift_id": 3, "shift_status": "BUSY", "vehicle_registration": "KA01AB1234"}"#,
        )
        .unwrap();
        let shift = active.into_shift().unwrap();
        assert_eq!(shift.status, ShiftStatus::Busy);
        assert_eq!(shift.vehicle_registration.as_deref(), Some("KA01AB1234"));

        let idle: ShiftStatusResponse = serde_json::from_str(
            r#"{"is_online": false, "shift_id": null, "shift_status": null, "vehicle_id": null,
                "vehicle_registration": null, "fleet_name": null, "assignment_start": null, "started_at": null}"#,
        )
        .unwrap();
        assert!(!idle.is_online);
        assert!(idle.into_shift().is_none());

        let ended: ShiftStatusResponse =
            serde_json::from_str(r#"{"is_online": false, "shift_id": 3, "shift_status": "OFFLINE"}"#).unwrap();
        assert!(ended.into_shift().is_none());
    }

    #[test]
    fn test_readiness_defaults_to_not_ready() {
        let readiness: ShiftReadiness = serde_json::from_str("{}").unwrap();
        assert!(!readiness.has_vehicle_assignment());
        assert!(!readiness.is_vehicle_approved());

        let ready: ShiftReadiness = serde_json::from_str(
            r#"{"checks": {"vehicle_assignment": {"exists": true, "is_vehicle_approved": true}}}"#,
        )
        .unwrap();
        assert!(ready.has_vehicle_assignment());
        assert!(ready.is_vehicle_approved());
    }

    #[test]
    fn test_profile_approval() {
        let profile: DriverProfile =
            serde_json::from_str(r#"{"driver_id": 9, "approval_status": "approved"}"#).unwrap();
        assert!(profile.is_approved());
        assert_eq!(profile.display_name(), "Driver");
    }
}

// src/views/driver.rs
use crate::models::{Shift, ShiftReadiness, ShiftStatus, TripStatus};

pub const ONLINE_COLOR: &str = "#4caf50";
pub const BUSY_COLOR: &str = "#ff9800";
pub const OFFLINE_COLOR: &str = "#f44336";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftView {
    pub label: String,
    pub color: &'static str,
    /// Label of the toggle button.
    pub toggle_label: &'static str,
    pub warning: Option<&'static str>,
    pub hint: Option<&'static str>,
}

/// `None` means the driver has no active shift.
pub fn shift_view(shift: Option<&Shift>) -> ShiftView {
    match shift {
        None => ShiftView {
            label: ShiftStatus::Offline.as_str().to_string(),
            color: OFFLINE_COLOR,
            toggle_label: "Go Online",
            warning: None,
            hint: Some("Click \"Go Online\" to start accepting trips"),
        },
        Some(shift) => {
            let color = match shift.status {
                ShiftStatus::Online => ONLINE_COLOR,
                ShiftStatus::Busy => BUSY_COLOR,
                _ => OFFLINE_COLOR,
            };
            ShiftView {
                label: shift.status.as_str().to_string(),
                color,
                toggle_label: "Go Offline",
                warning: (shift.status == ShiftStatus::Busy).then_some("You are currently on a trip"),
                hint: None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGate {
    pub can_accept: bool,
    pub blocked_reason: Option<&'static str>,
}

/// Whether offers may be accepted. Rejecting is never gated.
pub fn dispatch_gate(shift: Option<&Shift>, readiness: Option<&ShiftReadiness>) -> DispatchGate {
    let offline = shift.is_none_or(|shift| shift.status == ShiftStatus::Offline);
    let has_vehicle = readiness.is_some_and(ShiftReadiness::has_vehicle_assignment);
    let vehicle_approved = readiness.is_some_and(ShiftReadiness::is_vehicle_approved);

    let blocked_reason = if offline {
        Some("You are offline. Go online in the Dashboard to accept dispatches.")
    } else if !has_vehicle {
        Some("No vehicle assigned. Please assign a vehicle from the Dashboard.")
    } else if !vehicle_approved {
        Some("Your vehicle is not approved. Please wait for approval.")
    } else {
        None
    };

    DispatchGate {
        can_accept: blocked_reason.is_none(),
        blocked_reason,
    }
}

/// Primary button on the driver's active trip screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverTripAction {
    MarkArrived,
    EnterOtp,
    StartTrip,
    CompleteTrip,
    None,
}

impl DriverTripAction {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DriverTripAction::MarkArrived => Some("Mark Arrived"),
            DriverTripAction::EnterOtp => Some("Verify OTP"),
            DriverTripAction::StartTrip => Some("Start Trip"),
            DriverTripAction::CompleteTrip => Some("Complete Trip"),
            DriverTripAction::None => None,
        }
    }
}

pub fn driver_trip_action(status: &TripStatus, otp_verified: bool) -> DriverTripAction {
    match status {
        TripStatus::Assigned | TripStatus::DriverEnRoute => DriverTripAction::MarkArrived,
        TripStatus::Arrived if otp_verified => DriverTripAction::StartTrip,
        TripStatus::Arrived => DriverTripAction::EnterOtp,
        TripStatus::PickedUp | TripStatus::InProgress => DriverTripAction::CompleteTrip,
        _ => DriverTripAction::None,
    }
}

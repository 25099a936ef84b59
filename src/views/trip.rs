// src/views/trip.rs
use crate::models::TripStatus;

/// What the rider's trip screen shows for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub message: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub show_cancel: bool,
    pub show_otp: bool,
    pub is_final: bool,
}

const fn active(message: &'static str, icon: &'static str, color: &'static str, show_cancel: bool) -> StatusView {
    StatusView {
        message,
        icon,
        color,
        show_cancel,
        show_otp: false,
        is_final: false,
    }
}

const fn last(message: &'static str, icon: &'static str, color: &'static str) -> StatusView {
    StatusView {
        message,
        icon,
        color,
        show_cancel: false,
        show_otp: false,
        is_final: true,
    }
}

const REQUESTED: StatusView = active("Finding a driver for you...", "🔍", "#6366f1", true);
const DISPATCHING: StatusView = active("Looking for nearby drivers...", "📡", "#8b5cf6", true);
const ASSIGNED: StatusView = active("Driver assigned! They are on their way.", "🚗", "#22c55e", true);
const DRIVER_EN_ROUTE: StatusView = active("Driver is heading to your pickup location.", "🛣️", "#22c55e", true);
const ARRIVED: StatusView = StatusView {
    show_otp: true,
    ..active("Driver has arrived at your pickup location!", "📍", "#f59e0b", false)
};
const PICKED_UP: StatusView = active("You are on your way!", "🚀", "#3b82f6", false);
const IN_PROGRESS: StatusView = active("Trip in progress...", "🛤️", "#3b82f6", false);
const COMPLETED: StatusView = last("Trip completed! Thank you for riding with us.", "✅", "#22c55e");
const CANCELLED: StatusView = last("This trip has been cancelled.", "❌", "#ef4444");
const FAILED: StatusView = last("Sorry, no drivers are available right now.", "😔", "#ef4444");

pub fn trip_status_view(status: &TripStatus) -> &'static StatusView {
    match status {
        TripStatus::Requested => &REQUESTED,
        TripStatus::Dispatching => &DISPATCHING,
        TripStatus::Assigned => &ASSIGNED,
        TripStatus::DriverEnRoute => &DRIVER_EN_ROUTE,
        TripStatus::Arrived => &ARRIVED,
        TripStatus::PickedUp => &PICKED_UP,
        TripStatus::InProgress => &IN_PROGRESS,
        TripStatus::Completed => &COMPLETED,
        TripStatus::Cancelled => &CANCELLED,
        TripStatus::Failed => &FAILED,
        // Unknown statuses render as a fresh request
        TripStatus::Other(_) => &REQUESTED,
    }
}

pub fn status_view(raw: &str) -> &'static StatusView {
    trip_status_view(&TripStatus::parse(raw))
}

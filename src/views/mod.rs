// src/views/mod.rs
//! Pure mappings from backend status strings to what a screen shows.
pub mod driver;
pub mod format;
pub mod home;
pub mod trip;

pub use driver::{DispatchGate, DriverTripAction, ShiftView, dispatch_gate, driver_trip_action, shift_view};
pub use home::{CapabilityAction, HomeMenu, capability_action};
pub use trip::{StatusView, status_view, trip_status_view};

// src/services/mod.rs
pub mod api_client;
pub mod driver_service;
pub mod rider_service;
pub mod user_service;

pub use api_client::{ApiClient, Auth};
pub use driver_service::{DriverOperations, DriverService};
pub use rider_service::{RiderOperations, RiderService};
pub use user_service::{AuthOperations, AuthService, UserOperations, UserService};

// src/controllers/mod.rs
//! One controller per screen. Each owns a view store plus the poller and
//! dispatcher feeding it; callers only subscribe and invoke actions.
pub mod dashboard;
pub mod dispatch_board;
pub mod driver_trip;
pub mod home;
pub mod rider_trip;

pub use dashboard::DashboardController;
pub use dispatch_board::DispatchBoardController;
pub use driver_trip::DriverTripController;
pub use home::HomeController;
pub use rider_trip::RiderTripController;

use tokio::sync::Mutex;
use tracing;

use crate::errors::{SparrowError, SparrowResult};
use crate::models::DriverProfile;
use crate::poller::PollHandle;
use crate::services::DriverOperations;

/// Driver screens are only reachable with an approved profile.
pub async fn require_approved_driver(driver: &dyn DriverOperations) -> SparrowResult<DriverProfile> {
    match driver.get_my_profile().await? {
        Some(profile) if profile.is_approved() => Ok(profile),
        Some(profile) => {
            tracing::info!(
                "Driver {} is not approved ({:?})",
                profile.driver_id,
                profile.approval_status
            );
            Err(SparrowError::DriverNotApproved)
        }
        None => Err(SparrowError::DriverNotApproved),
    }
}

/// Slot for the poll loop a screen starts on mount.
#[derive(Default)]
pub(crate) struct PollSlot {
    handle: Mutex<Option<PollHandle>>,
}

impl PollSlot {
    pub(crate) async fn replace(&self, handle: PollHandle) {
        if let Some(mut previous) = self.handle.lock().await.replace(handle) {
            previous.stop();
        }
    }

    pub(crate) async fn stop(&self) -> bool {
        match self.handle.lock().await.take() {
            Some(mut handle) => handle.stop(),
            None => false,
        }
    }

    pub(crate) async fn is_running(&self) -> bool {
        self.handle.lock().await.as_ref().is_some_and(PollHandle::is_running)
    }
}

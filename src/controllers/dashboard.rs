// src/controllers/dashboard.rs
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing;

use crate::{
    controllers::require_approved_driver,
    dispatcher::{Action, ActionDispatcher},
    errors::SparrowResult,
    models::{DriverProfile, Shift},
    poller::{FetchFn, fetch_fn},
    services::DriverOperations,
    store::ViewStore,
    views::{ShiftView, shift_view},
};

/// Driver home: who is signed in and whether a shift is running.
pub struct DashboardController {
    driver: Arc<dyn DriverOperations>,
    store: ViewStore<Option<Shift>>,
    dispatcher: ActionDispatcher<Option<Shift>>,
    profile: RwLock<Option<DriverProfile>>,
    shift_fetch: FetchFn<Option<Shift>>,
}

impl DashboardController {
    pub fn new(driver: Arc<dyn DriverOperations>) -> Self {
        let store = ViewStore::new();
        let shift_fetch = active_shift_fetch(&driver);
        Self {
            dispatcher: ActionDispatcher::new(store.clone(), shift_fetch.clone()),
            driver,
            store,
            profile: RwLock::new(None),
            shift_fetch,
        }
    }

    pub fn store(&self) -> &ViewStore<Option<Shift>> {
        &self.store
    }

    pub async fn mount(&self) -> SparrowResult<DriverProfile> {
        let profile = require_approved_driver(self.driver.as_ref()).await?;
        *self.profile.write().await = Some(profile.clone());

        match (self.shift_fetch)().await {
            Ok(shift) => self.store.set_data(shift),
            Err(err) => {
                tracing::warn!("Failed to load shift: {}", err);
                self.store.set_error(err.banner_message("Failed to load shift status"));
            }
        }
        Ok(profile)
    }

    pub async fn profile(&self) -> Option<DriverProfile> {
        self.profile.read().await.clone()
    }

    pub fn shift(&self) -> Option<Shift> {
        self.store.data().flatten()
    }

    pub fn shift_view(&self) -> ShiftView {
        shift_view(self.shift().as_ref())
    }

    pub async fn go_online(&self) -> SparrowResult<Shift> {
        let driver = self.driver.clone();
        self.dispatcher
            .dispatch(Action::StartShift, "shift", async move { driver.start_shift().await })
            .await
    }

    pub async fn go_offline(&self) -> SparrowResult<Shift> {
        let driver = self.driver.clone();
        self.dispatcher
            .dispatch(Action::EndShift, "shift", async move { driver.end_shift().await })
            .await
    }

    /// Ends the running shift, or starts one when there is none.
    pub async fn toggle_shift(&self) -> SparrowResult<Shift> {
        if self.shift().is_some() {
            self.go_offline().await
        } else {
            self.go_online().await
        }
    }
}

fn active_shift_fetch(driver: &Arc<dyn DriverOperations>) -> FetchFn<Option<Shift>> {
    let driver = driver.clone();
    fetch_fn(move || {
        let driver = driver.clone();
        async move { driver.get_active_shift().await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::fakes::FakeDriver;
    use crate::errors::SparrowError;
    use crate::views::driver::{BUSY_COLOR, OFFLINE_COLOR, ONLINE_COLOR};

    #[tokio::test]
    async fn test_toggle_shift_round_trip() {
        let fake = Arc::new(FakeDriver::approved());
        let dashboard = DashboardController::new(fake.clone());
        let profile = dashboard.mount().await.unwrap();
        assert_eq!(profile.display_name(), "Ravi Kumar");
        assert_eq!(dashboard.shift_view().color, OFFLINE_COLOR);

        dashboard.toggle_shift().await.unwrap();
        assert_eq!(dashboard.shift_view().color, ONLINE_COLOR);
        assert_eq!(dashboard.shift_view().toggle_label, "Go Offline");

        dashboard.toggle_shift().await.unwrap();
        assert!(dashboard.shift().is_none());
        assert_eq!(fake.calls(), vec!["start_shift", "end_shift"]);
    }

    #[tokio::test]
    async fn test_busy_shift_shows_warning() {
        let fake = FakeDriver::approved();
        *fake.shift.lock().unwrap() = Some(crate::controllers::fakes::shift("BUSY"));
        let dashboard = DashboardController::new(Arc::new(fake));
        dashboard.mount().await.unwrap();

        let view = dashboard.shift_view();
        assert_eq!(view.color, BUSY_COLOR);
        assert!(view.warning.is_some());
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_shift() {
        let fake = FakeDriver::approved();
        fake.fail_next(SparrowError::api(400, "Vehicle not approved"));
        let fake = Arc::new(fake);
        let dashboard = DashboardController::new(fake.clone());
        dashboard.mount().await.unwrap();

        assert!(dashboard.go_online().await.is_err());
        assert!(dashboard.shift().is_none());
        assert_eq!(
            dashboard.store().snapshot().error.as_deref(),
            Some("Vehicle not approved")
        );
    }

    #[tokio::test]
    async fn test_unregistered_driver_is_refused() {
        let mut fake = FakeDriver::approved();
        fake.approval = None;
        let dashboard = DashboardController::new(Arc::new(fake));
        assert!(matches!(
            dashboard.mount().await,
            Err(SparrowError::DriverNotApproved)
        ));
    }
}

// src/controllers/driver_trip.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing;

use crate::{
    controllers::PollSlot,
    dispatcher::{Action, ActionDispatcher},
    errors::{SparrowError, SparrowResult},
    models::{ActiveTrip, OtpVerification, TripTransition},
    poller::{FetchFn, StatusPoller, fetch_fn},
    services::DriverOperations,
    store::{ViewState, ViewStore},
    views::{DriverTripAction, driver_trip_action},
};

pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Default)]
struct OtpEntry {
    trip_id: Option<i64>,
    code: String,
    verified: bool,
}

impl OtpEntry {
    fn verified_for(&self, trip_id: i64) -> bool {
        self.verified && self.trip_id == Some(trip_id)
    }
}

/// Exactly six ASCII digits, nothing else.
pub fn is_valid_otp(input: &str) -> bool {
    input.len() == OTP_LENGTH && input.bytes().all(|b| b.is_ascii_digit())
}

/// Driver's current trip: arrive, verify the rider's OTP, start, complete.
pub struct DriverTripController {
    driver: Arc<dyn DriverOperations>,
    period: Duration,
    store: ViewStore<Option<ActiveTrip>>,
    dispatcher: ActionDispatcher<Option<ActiveTrip>>,
    poll: PollSlot,
    otp: Mutex<OtpEntry>,
}

impl DriverTripController {
    pub fn new(driver: Arc<dyn DriverOperations>, period: Duration) -> Self {
        let store = ViewStore::new();
        let dispatcher = ActionDispatcher::new(store.clone(), active_trip_fetch(&driver));
        Self {
            driver,
            period,
            store,
            dispatcher,
            poll: PollSlot::default(),
            otp: Mutex::new(OtpEntry::default()),
        }
    }

    pub fn store(&self) -> &ViewStore<Option<ActiveTrip>> {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<Option<ActiveTrip>>> {
        self.store.subscribe()
    }

    pub fn trip(&self) -> Option<ActiveTrip> {
        self.store.data().flatten()
    }

    pub async fn mount(&self) -> SparrowResult<()> {
        let handle = StatusPoller::new("driver active trip", self.period, self.store.clone(), active_trip_fetch(&self.driver))
            .with_error_message("Failed to load active trip")
            .start()
            .await?;
        self.poll.replace(handle).await;
        Ok(())
    }

    pub async fn unmount(&self) -> bool {
        self.poll.stop().await
    }

    pub async fn primary_action(&self) -> DriverTripAction {
        match self.trip() {
            Some(trip) => {
                let verified = self.otp.lock().await.verified_for(trip.trip_id);
                driver_trip_action(&trip.status, verified)
            }
            None => DriverTripAction::None,
        }
    }

    fn current_trip_id(&self) -> SparrowResult<i64> {
        self.trip()
            .map(|trip| trip.trip_id)
            .ok_or_else(|| SparrowError::validation_error("trip", "No active trip"))
    }

    pub async fn mark_arrived(&self) -> SparrowResult<TripTransition> {
        let trip_id = self.current_trip_id()?;
        let driver = self.driver.clone();
        self.dispatcher
            .dispatch(Action::MarkArrived, trip_id, async move { driver.mark_arrived(trip_id).await })
            .await
    }

    /// Replaces the typed code. Anything but six digits is refused and the
    /// previous entry is kept.
    pub async fn enter_otp(&self, input: &str) -> SparrowResult<()> {
        let input = input.trim();
        if !is_valid_otp(input) {
            return Err(SparrowError::validation_error("otp", "Enter the 6-digit OTP"));
        }
        let trip_id = self.current_trip_id()?;
        let mut entry = self.otp.lock().await;
        *entry = OtpEntry {
            trip_id: Some(trip_id),
            code: input.to_string(),
            verified: false,
        };
        Ok(())
    }

    pub async fn verify_otp(&self) -> SparrowResult<OtpVerification> {
        let trip_id = self.current_trip_id()?;
        let code = {
            let entry = self.otp.lock().await;
            if entry.trip_id != Some(trip_id) || !is_valid_otp(&entry.code) {
                return Err(SparrowError::validation_error("otp", "Enter the 6-digit OTP"));
            }
            entry.code.clone()
        };

        let driver = self.driver.clone();
        let verification = self
            .dispatcher
            .dispatch(Action::VerifyPickupOtp, trip_id, async move {
                driver.verify_pickup_otp(trip_id, &code).await
            })
            .await?;

        let mut entry = self.otp.lock().await;
        if entry.trip_id == Some(trip_id) {
            entry.verified = true;
        }
        tracing::info!("Pickup OTP verified for trip {}", trip_id);
        Ok(verification)
    }

    /// Confirms pickup. Only offered after the OTP has been verified.
    pub async fn start_trip(&self) -> SparrowResult<TripTransition> {
        let trip_id = self.current_trip_id()?;
        if !self.otp.lock().await.verified_for(trip_id) {
            return Err(SparrowError::validation_error("otp", "Verify the pickup OTP first"));
        }
        let driver = self.driver.clone();
        let started = self
            .dispatcher
            .dispatch(Action::ConfirmPickup, trip_id, async move { driver.confirm_pickup(trip_id).await })
            .await?;
        *self.otp.lock().await = OtpEntry::default();
        Ok(started)
    }

    pub async fn complete_trip(&self) -> SparrowResult<TripTransition> {
        let trip_id = self.current_trip_id()?;
        let driver = self.driver.clone();
        self.dispatcher
            .dispatch(Action::CompleteTrip, trip_id, async move { driver.complete_trip(trip_id).await })
            .await
    }
}

fn active_trip_fetch(driver: &Arc<dyn DriverOperations>) -> FetchFn<Option<ActiveTrip>> {
    let driver = driver.clone();
    fetch_fn(move || {
        let driver = driver.clone();
        async move { driver.get_active_trip().await }
    })
}

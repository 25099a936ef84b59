// src/controllers/rider_trip.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing;

use crate::{
    controllers::PollSlot,
    dispatcher::{Action, ActionDispatcher},
    errors::SparrowResult,
    models::{CancelledTrip, Trip, TripStatus},
    poller::{FetchFn, StatusPoller, fetch_fn},
    services::RiderOperations,
    store::{ViewState, ViewStore},
    views::{StatusView, trip_status_view},
};

/// Rider's live view of one trip: polls it, fetches the pickup OTP once the
/// driver arrives, and lets the rider cancel.
pub struct RiderTripController {
    trip_id: i64,
    rider: Arc<dyn RiderOperations>,
    period: Duration,
    store: ViewStore<Trip>,
    otp: ViewStore<String>,
    dispatcher: ActionDispatcher<Trip>,
    poll: PollSlot,
    otp_watch: Mutex<Option<JoinHandle<()>>>,
}

impl RiderTripController {
    pub fn new(trip_id: i64, rider: Arc<dyn RiderOperations>, period: Duration) -> Self {
        let store = ViewStore::new();
        let dispatcher = ActionDispatcher::new(store.clone(), trip_fetch(&rider, trip_id));
        Self {
            trip_id,
            rider,
            period,
            store,
            otp: ViewStore::new(),
            dispatcher,
            poll: PollSlot::default(),
            otp_watch: Mutex::new(None),
        }
    }

    pub fn trip_id(&self) -> i64 {
        self.trip_id
    }

    pub fn store(&self) -> &ViewStore<Trip> {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<Trip>> {
        self.store.subscribe()
    }

    /// Pickup code shown to the rider once the driver is at the pickup.
    pub fn pickup_otp(&self) -> Option<String> {
        self.otp.data()
    }

    pub fn status_view(&self) -> &'static StatusView {
        match self.store.data() {
            Some(trip) => trip_status_view(&trip.status),
            None => trip_status_view(&TripStatus::Requested),
        }
    }

    pub async fn mount(&self) -> SparrowResult<()> {
        tracing::info!("Watching trip {}", self.trip_id);
        let handle = StatusPoller::new(
            format!("trip {}", self.trip_id),
            self.period,
            self.store.clone(),
            trip_fetch(&self.rider, self.trip_id),
        )
        .with_error_message("Failed to load trip status")
        .start()
        .await?;
        self.poll.replace(handle).await;

        let task = tokio::spawn(watch_for_arrival(
            self.rider.clone(),
            self.store.subscribe(),
            self.otp.clone(),
        ));
        if let Some(previous) = self.otp_watch.lock().await.replace(task) {
            previous.abort();
        }
        Ok(())
    }

    pub async fn is_polling(&self) -> bool {
        self.poll.is_running().await
    }

    pub async fn cancel(&self) -> SparrowResult<CancelledTrip> {
        let rider = self.rider.clone();
        let trip_id = self.trip_id;
        let cancelled = self
            .dispatcher
            .dispatch(Action::CancelTrip, trip_id, async move { rider.cancel_trip(trip_id).await })
            .await?;

        self.poll.stop().await;
        // The server accepted the cancel even if the re-fetch did not land.
        self.store.update(|state| {
            if let Some(trip) = state.data.as_mut() {
                if !trip.status.is_terminal() {
                    trip.status = TripStatus::Cancelled;
                }
            }
        });
        Ok(cancelled)
    }

    /// Returns whether a running poll loop was stopped.
    pub async fn unmount(&self) -> bool {
        if let Some(task) = self.otp_watch.lock().await.take() {
            task.abort();
        }
        let stopped = self.poll.stop().await;
        tracing::debug!("Left trip {} (poll stopped: {})", self.trip_id, stopped);
        stopped
    }
}

fn trip_fetch(rider: &Arc<dyn RiderOperations>, trip_id: i64) -> FetchFn<Trip> {
    let rider = rider.clone();
    fetch_fn(move || {
        let rider = rider.clone();
        async move { rider.get_trip(trip_id).await }
    })
}

async fn watch_for_arrival(
    rider: Arc<dyn RiderOperations>,
    mut trips: watch::Receiver<ViewState<Trip>>,
    otp: ViewStore<String>,
) {
    loop {
        let trip = trips.borrow_and_update().data.clone();
        if let Some(trip) = trip {
            if trip.status == TripStatus::Arrived && otp.data().is_none() {
                generate_pickup_otp(rider.as_ref(), &trip, &otp).await;
                // One request per screen; a failure falls back to the trip copy.
                return;
            }
            if trip.status.is_terminal() {
                return;
            }
        }
        if trips.changed().await.is_err() {
            return;
        }
    }
}

async fn generate_pickup_otp(rider: &dyn RiderOperations, trip: &Trip, otp: &ViewStore<String>) {
    match rider.generate_pickup_otp(trip.trip_id).await {
        Ok(generated) => match generated.code() {
            Some(code) => otp.set_data(code.to_string()),
            None => fall_back_to_trip_otp(trip, otp, "Pickup OTP missing from response"),
        },
        Err(err) => {
            tracing::warn!("Failed to generate OTP for trip {}: {}", trip.trip_id, err);
            fall_back_to_trip_otp(trip, otp, &err.banner_message("Failed to generate OTP"));
        }
    }
}

fn fall_back_to_trip_otp(trip: &Trip, otp: &ViewStore<String>, message: &str) {
    match trip.pickup_otp.as_deref() {
        Some(code) => otp.set_data(code.to_string()),
        None => otp.set_error(message),
    }
}

// src/dispatcher.rs
//! One mutating call, then one re-fetch. No retries, no idempotency keys.
use std::fmt;
use std::future::Future;
use tracing;

use crate::errors::SparrowResult;
use crate::poller::FetchFn;
use crate::store::ViewStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AcceptDispatch,
    RejectDispatch,
    CancelTrip,
    MarkArrived,
    VerifyPickupOtp,
    ConfirmPickup,
    CompleteTrip,
    StartShift,
    EndShift,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AcceptDispatch => "accept_dispatch",
            Action::RejectDispatch => "reject_dispatch",
            Action::CancelTrip => "cancel_trip",
            Action::MarkArrived => "mark_arrived",
            Action::VerifyPickupOtp => "verify_pickup_otp",
            Action::ConfirmPickup => "confirm_pickup",
            Action::CompleteTrip => "complete_trip",
            Action::StartShift => "start_shift",
            Action::EndShift => "end_shift",
        }
    }

    /// Shown when the server gives no `detail`.
    pub fn default_error(&self) -> &'static str {
        match self {
            Action::AcceptDispatch => "Failed to accept dispatch",
            Action::RejectDispatch => "Failed to reject dispatch",
            Action::CancelTrip => "Failed to cancel ride",
            Action::MarkArrived => "Failed to mark arrived",
            Action::VerifyPickupOtp => "Invalid OTP",
            Action::ConfirmPickup => "Failed to start trip",
            Action::CompleteTrip => "Failed to complete trip",
            Action::StartShift => "Failed to go online",
            Action::EndShift => "Failed to go offline",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ActionDispatcher<T> {
    store: ViewStore<T>,
    refetch: FetchFn<T>,
}

impl<T> Clone for ActionDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            refetch: self.refetch.clone(),
        }
    }
}

impl<T> ActionDispatcher<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(store: ViewStore<T>, refetch: FetchFn<T>) -> Self {
        Self { store, refetch }
    }

    pub fn store(&self) -> &ViewStore<T> {
        &self.store
    }

    /// Runs `call`. On success the resource is fetched exactly once more and
    /// the call's own result is returned even if that fetch fails. On failure
    /// the data already in the store is left as is.
    pub async fn dispatch<R, Fut>(&self, action: Action, target: impl ToString, call: Fut) -> SparrowResult<R>
    where
        Fut: Future<Output = SparrowResult<R>>,
    {
        let target = target.to_string();
        tracing::info!("Dispatching {} for {}", action, target);
        self.store.begin_action(action, &target);

        let outcome = match call.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("{} for {} failed: {}", action, target, err);
                let message = err.banner_message(action.default_error());
                self.store.update(|state| {
                    state.pending_action = None;
                    state.error = Some(message);
                });
                return Err(err);
            }
        };

        match (self.refetch)().await {
            Ok(fresh) => self.store.set_data(fresh),
            Err(err) => {
                tracing::warn!("Refresh after {} failed: {}", action, err);
                self.store.set_error(err.banner_message("Failed to refresh"));
            }
        }
        self.store.end_action();
        Ok(outcome)
    }
}

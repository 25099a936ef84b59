// src/controllers/dispatch_board.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing;

use crate::{
    controllers::{PollSlot, require_approved_driver},
    dispatcher::{Action, ActionDispatcher},
    errors::{SparrowError, SparrowResult},
    models::{DispatchAcceptance, DispatchRejection, DriverProfile, PendingDispatch, Shift, ShiftReadiness},
    poller::{FetchFn, StatusPoller, fetch_fn},
    services::DriverOperations,
    store::{ViewState, ViewStore},
    views::{DispatchGate, dispatch_gate},
};

#[derive(Debug, Clone, Default)]
struct BoardContext {
    profile: Option<DriverProfile>,
    shift: Option<Shift>,
    readiness: Option<ShiftReadiness>,
}

/// Incoming offers for the signed-in driver.
pub struct DispatchBoardController {
    driver: Arc<dyn DriverOperations>,
    period: Duration,
    store: ViewStore<Vec<PendingDispatch>>,
    dispatcher: ActionDispatcher<Vec<PendingDispatch>>,
    poll: PollSlot,
    context: RwLock<BoardContext>,
}

impl DispatchBoardController {
    pub fn new(driver: Arc<dyn DriverOperations>, period: Duration) -> Self {
        let store = ViewStore::new();
        let dispatcher = ActionDispatcher::new(store.clone(), pending_fetch(&driver));
        Self {
            driver,
            period,
            store,
            dispatcher,
            poll: PollSlot::default(),
            context: RwLock::new(BoardContext::default()),
        }
    }

    pub fn store(&self) -> &ViewStore<Vec<PendingDispatch>> {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<Vec<PendingDispatch>>> {
        self.store.subscribe()
    }

    /// Checks approval, loads shift and readiness, then starts polling offers.
    pub async fn mount(&self) -> SparrowResult<()> {
        let profile = require_approved_driver(self.driver.as_ref()).await?;
        self.context.write().await.profile = Some(profile);
        self.reload_context().await;

        let handle = StatusPoller::new("pending dispatches", self.period, self.store.clone(), pending_fetch(&self.driver))
            .with_error_message("Failed to load dispatches")
            .start()
            .await?;
        self.poll.replace(handle).await;
        Ok(())
    }

    pub async fn unmount(&self) -> bool {
        self.poll.stop().await
    }

    /// Shift and readiness feed the accept gate. Failures degrade to `None`.
    async fn reload_context(&self) {
        let shift = self.driver.get_active_shift().await.unwrap_or_else(|err| {
            tracing::warn!("Could not load active shift: {}", err);
            None
        });
        let readiness = match self.driver.check_shift_readiness().await {
            Ok(readiness) => Some(readiness),
            Err(err) => {
                tracing::warn!("Could not load shift readiness: {}", err);
                None
            }
        };
        let mut context = self.context.write().await;
        context.shift = shift;
        context.readiness = readiness;
    }

    pub async fn profile(&self) -> Option<DriverProfile> {
        self.context.read().await.profile.clone()
    }

    pub async fn shift(&self) -> Option<Shift> {
        self.context.read().await.shift.clone()
    }

    pub async fn gate(&self) -> DispatchGate {
        let context = self.context.read().await;
        dispatch_gate(context.shift.as_ref(), context.readiness.as_ref())
    }

    pub async fn accept(&self, attempt_id: i64) -> SparrowResult<DispatchAcceptance> {
        if let Some(reason) = self.gate().await.blocked_reason {
            self.store.set_error(reason);
            return Err(SparrowError::validation_error("dispatch", reason));
        }
        let driver = self.driver.clone();
        let accepted = self
            .dispatcher
            .dispatch(Action::AcceptDispatch, attempt_id, async move {
                driver.accept_dispatch(attempt_id).await
            })
            .await?;
        tracing::info!("Accepted dispatch {} for trip {}", attempt_id, accepted.trip_id);
        self.reload_context().await;
        Ok(accepted)
    }

    pub async fn reject(&self, attempt_id: i64) -> SparrowResult<DispatchRejection> {
        let driver = self.driver.clone();
        let rejected = self
            .dispatcher
            .dispatch(Action::RejectDispatch, attempt_id, async move {
                driver.reject_dispatch(attempt_id).await
            })
            .await?;
        self.reload_context().await;
        Ok(rejected)
    }
}

fn pending_fetch(driver: &Arc<dyn DriverOperations>) -> FetchFn<Vec<PendingDispatch>> {
    let driver = driver.clone();
    fetch_fn(move || {
        let driver = driver.clone();
        async move { driver.get_pending_dispatches().await }
    })
}

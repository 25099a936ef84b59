// src/poller.rs
//! Fetch-now-then-every-period loop that stops on a terminal status or when
//! its handle is cancelled.
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing;

use crate::errors::SparrowResult;
use crate::models::{ActiveTrip, PendingDispatch, Trip};
use crate::store::ViewStore;

/// Resources that can reach a state after which polling is pointless.
pub trait PollStatus {
    fn is_terminal(&self) -> bool;
}

impl PollStatus for Trip {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl PollStatus for ActiveTrip {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl<T: PollStatus> PollStatus for Option<T> {
    fn is_terminal(&self) -> bool {
        self.as_ref().is_some_and(PollStatus::is_terminal)
    }
}

// Offers keep arriving for as long as the screen is open.
impl PollStatus for Vec<PendingDispatch> {
    fn is_terminal(&self) -> bool {
        false
    }
}

pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, SparrowResult<T>> + Send + Sync>;

pub fn fetch_fn<T, F, Fut>(f: F) -> FetchFn<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SparrowResult<T>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Terminal,
    Cancelled,
}

pub struct StatusPoller<T> {
    name: String,
    period: Duration,
    fetch: FetchFn<T>,
    store: ViewStore<T>,
    error_message: String,
}

impl<T> StatusPoller<T>
where
    T: PollStatus + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, period: Duration, store: ViewStore<T>, fetch: FetchFn<T>) -> Self {
        Self {
            name: name.into(),
            period,
            fetch,
            store,
            error_message: "Failed to load".to_string(),
        }
    }

    /// Banner text used when a failed fetch carries no server detail.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Runs the first fetch inline. A failure there is returned and no timer
    /// is started; afterwards failures only land in the store.
    pub async fn start(self) -> SparrowResult<PollHandle> {
        let StatusPoller {
            name,
            period,
            fetch,
            store,
            error_message,
        } = self;

        tracing::debug!("Starting poller {} every {:?}", name, period);
        let first = match fetch().await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Initial fetch for {} failed: {}", name, err);
                store.set_error(err.banner_message(&error_message));
                return Err(err);
            }
        };

        let terminal = first.is_terminal();
        store.set_data(first);
        if terminal {
            tracing::debug!("Poller {} reached a terminal state on first fetch", name);
            return Ok(PollHandle::finished(name));
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_loop(name.clone(), period, fetch, store, error_message, stop_rx));

        Ok(PollHandle {
            name,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }
}

async fn run_loop<T>(
    name: String,
    period: Duration,
    fetch: FetchFn<T>,
    store: ViewStore<T>,
    error_message: String,
    mut stop_rx: oneshot::Receiver<()>,
) -> PollExit
where
    T: PollStatus + Send + Sync + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => return PollExit::Cancelled,
            _ = ticker.tick() => {}
        }

        // A fetch still in flight when cancellation arrives is abandoned.
        tokio::select! {
            biased;
            _ = &mut stop_rx => return PollExit::Cancelled,
            result = fetch() => match result {
                Ok(value) => {
                    let terminal = value.is_terminal();
                    store.set_data(value);
                    if terminal {
                        tracing::debug!("Poller {} reached a terminal state", name);
                        return PollExit::Terminal;
                    }
                }
                Err(err) => {
                    tracing::warn!("Poll of {} failed: {}", name, err);
                    store.set_error(err.banner_message(&error_message));
                }
            }
        }
    }
}

/// Owner of a running poll loop. Dropping it cancels the loop.
pub struct PollHandle {
    name: String,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<PollExit>>,
}

impl PollHandle {
    fn finished(name: String) -> Self {
        Self {
            name,
            stop_tx: None,
            task: None,
        }
    }

    /// Returns true only for the call that actually cancelled a live loop.
    pub fn stop(&mut self) -> bool {
        match self.stop_tx.take() {
            Some(tx) => {
                let delivered = tx.send(()).is_ok();
                if delivered {
                    tracing::debug!("Stopped poller {}", self.name);
                }
                delivered
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Waits for the loop to end on its own or after `stop`.
    pub async fn wait(mut self) -> PollExit {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(PollExit::Cancelled),
            None => PollExit::Terminal,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

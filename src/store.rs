// src/store.rs
//! Screen state shared between a poller, an action dispatcher and whoever
//! renders it. Backed by a watch channel so renderers can await changes.
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::dispatcher::Action;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub action: Action,
    pub target: String,
}

#[derive(Debug, Clone)]
pub struct ViewState<T> {
    pub data: Option<T>,
    pub loading: bool,
    /// Dismissible banner text.
    pub error: Option<String>,
    pub pending_action: Option<PendingAction>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            pending_action: None,
            last_updated: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn is_processing(&self, target: &str) -> bool {
        self.pending_action
            .as_ref()
            .is_some_and(|pending| pending.target == target)
    }
}

pub struct ViewStore<T> {
    tx: Arc<watch::Sender<ViewState<T>>>,
}

impl<T> Clone for ViewStore<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> Default for ViewStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewStore<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.tx.subscribe()
    }

    pub fn update(&self, modify: impl FnOnce(&mut ViewState<T>)) {
        self.tx.send_modify(modify);
    }

    pub fn set_data(&self, data: T) {
        self.update(|state| {
            state.data = Some(data);
            state.loading = false;
            state.error = None;
            state.last_updated = Some(Utc::now());
        });
    }

    /// Records a failure without touching the data already on screen.
    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|state| {
            state.error = Some(message);
            state.loading = false;
        });
    }

    pub fn dismiss_error(&self) {
        self.update(|state| state.error = None);
    }

    pub fn begin_action(&self, action: Action, target: &str) {
        let target = target.to_string();
        self.update(|state| {
            state.pending_action = Some(PendingAction { action, target });
            state.error = None;
        });
    }

    pub fn end_action(&self) {
        self.update(|state| state.pending_action = None);
    }
}

impl<T: Clone> ViewStore<T> {
    pub fn snapshot(&self) -> ViewState<T> {
        self.tx.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.tx.borrow().data.clone()
    }
}

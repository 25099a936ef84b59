pub mod config;
pub mod controllers;
pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod poller;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod utils;
pub mod views;

// Re-export commonly used types
pub use config::ClientConfig;
pub use dispatcher::{Action, ActionDispatcher};
pub use errors::{SparrowError, SparrowResult, ValidationError};
pub use poller::{PollExit, PollHandle, PollStatus, StatusPoller};
pub use state::ClientState;
pub use store::{ViewState, ViewStore};

// src/state.rs
use std::sync::Arc;

use crate::{
    config::ClientConfig,
    controllers::{
        DashboardController, DispatchBoardController, DriverTripController, HomeController, RiderTripController,
    },
    errors::SparrowResult,
    services::{
        ApiClient, AuthOperations, AuthService, DriverOperations, DriverService, RiderOperations, RiderService,
        UserOperations, UserService,
    },
    session::{FileSessionStore, Session},
};

/// Everything a front end needs: one HTTP client, one session, and the
/// services built on top of them.
pub struct ClientState {
    pub session: Session,
    pub api: Arc<ApiClient>,
    pub auth_service: Arc<dyn AuthOperations>,
    pub user_service: Arc<dyn UserOperations>,
    pub rider_service: Arc<dyn RiderOperations>,
    pub driver_service: Arc<dyn DriverOperations>,
    pub config: ClientConfig,
}

impl ClientState {
    /// Session persisted to `config.session_file`.
    pub fn new(config: ClientConfig) -> SparrowResult<Self> {
        let session = Session::new(Arc::new(FileSessionStore::new(&config.session_file)));
        Self::with_session(config, session)
    }

    pub fn with_session(config: ClientConfig, session: Session) -> SparrowResult<Self> {
        config.validate()?;
        let api = Arc::new(ApiClient::new(&config, session.clone())?);
        tracing::debug!("Client state ready for {}", api.base_url());

        Ok(Self {
            auth_service: Arc::new(AuthService::new(api.clone())),
            user_service: Arc::new(UserService::new(api.clone())),
            rider_service: Arc::new(RiderService::new(api.clone())),
            driver_service: Arc::new(DriverService::new(api.clone())),
            session,
            api,
            config,
        })
    }

    pub fn home(&self) -> HomeController {
        HomeController::new(self.user_service.clone())
    }

    pub fn rider_trip(&self, trip_id: i64) -> RiderTripController {
        RiderTripController::new(trip_id, self.rider_service.clone(), self.config.trip_poll_interval)
    }

    pub fn driver_trip(&self) -> DriverTripController {
        DriverTripController::new(self.driver_service.clone(), self.config.driver_trip_poll_interval)
    }

    pub fn dispatch_board(&self) -> DispatchBoardController {
        DispatchBoardController::new(self.driver_service.clone(), self.config.dispatch_poll_interval)
    }

    pub fn dashboard(&self) -> DashboardController {
        DashboardController::new(self.driver_service.clone())
    }
}

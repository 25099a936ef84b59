// src/services/driver_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::SparrowError as AppError,
    models::{
        dispatch::{DispatchAcceptance, DispatchRejection, PendingDispatch, PendingDispatchList},
        driver::{DriverProfile, Shift, ShiftReadiness, ShiftStatusResponse},
        trip::{ActiveTrip, ActiveTripEnvelope, OtpSubmission, OtpVerification, TripTransition},
    },
    services::api_client::{ApiClient, Auth},
};

#[async_trait]
pub trait DriverOperations: Send + Sync {
    async fn get_my_profile(&self) -> Result<Option<DriverProfile>, AppError>;
    async fn start_shift(&self) -> Result<Shift, AppError>;
    async fn end_shift(&self) -> Result<Shift, AppError>;
    async fn get_active_shift(&self) -> Result<Option<Shift>, AppError>;
    async fn check_shift_readiness(&self) -> Result<ShiftReadiness, AppError>;
    async fn get_pending_dispatches(&self) -> Result<Vec<PendingDispatch>, AppError>;
    async fn accept_dispatch(&self, attempt_id: i64) -> Result<DispatchAcceptance, AppError>;
    async fn reject_dispatch(&self, attempt_id: i64) -> Result<DispatchRejection, AppError>;
    async fn get_active_trip(&self) -> Result<Option<ActiveTrip>, AppError>;
    async fn mark_arrived(&self, trip_id: i64) -> Result<TripTransition, AppError>;
    async fn verify_pickup_otp(&self, trip_id: i64, otp: &str) -> Result<OtpVerification, AppError>;
    async fn confirm_pickup(&self, trip_id: i64) -> Result<TripTransition, AppError>;
    async fn complete_trip(&self, trip_id: i64) -> Result<TripTransition, AppError>;
}

pub struct DriverService {
    api: Arc<ApiClient>,
}

impl DriverService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    async fn trip_transition(&self, trip_id: i64, step: &str, default_message: &str) -> Result<TripTransition, AppError> {
        tracing::info!("Driver trip {}: {}", trip_id, step);
        self.api
            .post::<(), _>(
                &format!("/dispatch/driver/trips/{trip_id}/{step}"),
                None,
                Auth::User,
                default_message,
            )
            .await
    }
}

#[async_trait]
impl DriverOperations for DriverService {
    async fn get_my_profile(&self) -> Result<Option<DriverProfile>, AppError> {
        self.api
            .get_optional("/driver/me", Auth::User, "Failed to fetch driver profile")
            .await
    }

    async fn start_shift(&self) -> Result<Shift, AppError> {
        tracing::info!("Starting shift");
        self.api
            .post::<(), _>("/driver/availability/online", None, Auth::User, "Failed to start shift")
            .await
    }

    async fn end_shift(&self) -> Result<Shift, AppError> {
        tracing::info!("Ending shift");
        self.api
            .post::<(), _>("/driver/availability/offline", None, Auth::User, "Failed to end shift")
            .await
    }

    async fn get_active_shift(&self) -> Result<Option<Shift>, AppError> {
        let status: Option<ShiftStatusResponse> = self
            .api
            .get_optional("/driver/shift/active", Auth::User, "Failed to fetch active shift")
            .await?;
        Ok(status.and_then(ShiftStatusResponse::into_shift))
    }

    async fn check_shift_readiness(&self) -> Result<ShiftReadiness, AppError> {
        self.api
            .get("/driver/shift/readiness", Auth::User, "Failed to check shift readiness")
            .await
    }

    async fn get_pending_dispatches(&self) -> Result<Vec<PendingDispatch>, AppError> {
        let list: Option<PendingDispatchList> = self
            .api
            .get(
                "/dispatch/driver/dispatches/pending",
                Auth::User,
                "Failed to fetch pending dispatches",
            )
            .await?;
        Ok(list.map(|l| l.pending_dispatches).unwrap_or_default())
    }

    async fn accept_dispatch(&self, attempt_id: i64) -> Result<DispatchAcceptance, AppError> {
        tracing::info!("Accepting dispatch: {}", attempt_id);
        self.api
            .post::<(), _>(
                &format!("/dispatch/{attempt_id}/accept"),
                None,
                Auth::User,
                "Failed to accept dispatch",
            )
            .await
    }

    async fn reject_dispatch(&self, attempt_id: i64) -> Result<DispatchRejection, AppError> {
        tracing::info!("Rejecting dispatch: {}", attempt_id);
        self.api
            .post::<(), _>(
                &format!("/dispatch/{attempt_id}/reject"),
                None,
                Auth::User,
                "Failed to reject dispatch",
            )
            .await
    }

    async fn get_active_trip(&self) -> Result<Option<ActiveTrip>, AppError> {
        let envelope: Option<ActiveTripEnvelope<ActiveTrip>> = self
            .api
            .get("/dispatch/driver/trips/active", Auth::User, "Failed to fetch active trip")
            .await?;
        Ok(envelope.and_then(|e| e.active_trip))
    }

    async fn mark_arrived(&self, trip_id: i64) -> Result<TripTransition, AppError> {
        self.trip_transition(trip_id, "arrive", "Failed to mark arrival").await
    }

    async fn verify_pickup_otp(&self, trip_id: i64, otp: &str) -> Result<OtpVerification, AppError> {
        tracing::info!("Verifying pickup OTP for trip {}", trip_id);
        let body = OtpSubmission { otp: otp.to_string() };
        let verification: Option<OtpVerification> = self
            .api
            .post(
                &format!("/dispatch/driver/trips/{trip_id}/verify-otp"),
                Some(&body),
                Auth::User,
                "Failed to verify OTP",
            )
            .await?;
        let verification = verification.unwrap_or_default();
        if verification.verified == Some(false) {
            return Err(AppError::api(
                400,
                verification.message.unwrap_or_else(|| "Invalid OTP".to_string()),
            ));
        }
        Ok(verification)
    }

    async fn confirm_pickup(&self, trip_id: i64) -> Result<TripTransition, AppError> {
        self.trip_transition(trip_id, "pickup", "Failed to confirm pickup").await
    }

    async fn complete_trip(&self, trip_id: i64) -> Result<TripTransition, AppError> {
        self.trip_transition(trip_id, "complete", "Failed to complete trip").await
    }
}

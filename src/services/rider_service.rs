// src/services/rider_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::SparrowError as AppError,
    models::trip::{
        ActiveTripEnvelope, CancelledTrip, CategoryEstimate, CreatedTrip, FareEstimate,
        LocationValidation, PickupOtp, Trip, TripLocations, TripRequest, VehicleCategory,
    },
    services::api_client::{ApiClient, Auth},
};

#[async_trait]
pub trait RiderOperations: Send + Sync {
    async fn validate_location(&self, locations: TripLocations) -> Result<LocationValidation, AppError>;
    async fn fare_estimate(&self, request: TripRequest) -> Result<FareEstimate, AppError>;
    async fn all_fare_estimates(&self, locations: TripLocations) -> Result<Vec<CategoryEstimate>, AppError>;
    async fn create_trip(&self, request: TripRequest) -> Result<CreatedTrip, AppError>;
    async fn get_trip(&self, trip_id: i64) -> Result<Trip, AppError>;
    async fn cancel_trip(&self, trip_id: i64) -> Result<CancelledTrip, AppError>;
    async fn generate_pickup_otp(&self, trip_id: i64) -> Result<PickupOtp, AppError>;
    async fn get_active_trip(&self) -> Result<Option<Trip>, AppError>;
}

pub struct RiderService {
    api: Arc<ApiClient>,
}

impl RiderService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RiderOperations for RiderService {
    async fn validate_location(&self, locations: TripLocations) -> Result<LocationValidation, AppError> {
        self.api
            .post("/trips/validate-location", Some(&locations), Auth::User, "Location validation failed")
            .await
    }

    async fn fare_estimate(&self, request: TripRequest) -> Result<FareEstimate, AppError> {
        self.api
            .post("/trips/estimate", Some(&request), Auth::User, "Failed to get fare estimate")
            .await
    }

    async fn all_fare_estimates(&self, locations: TripLocations) -> Result<Vec<CategoryEstimate>, AppError> {
        let mut estimates = Vec::new();

        for category in VehicleCategory::ALL {
            let request = TripRequest {
                locations,
                vehicle_category: category,
            };
            match self.fare_estimate(request).await {
                Ok(estimate) => estimates.push(CategoryEstimate { category, estimate }),
                // A category that cannot be priced is left out of the comparison
                Err(err) => tracing::warn!("Failed to get estimate for {}: {}", category.as_str(), err),
            }
        }

        Ok(estimates)
    }

    async fn create_trip(&self, request: TripRequest) -> Result<CreatedTrip, AppError> {
        tracing::info!("Booking {} trip", request.vehicle_category.as_str());
        let created: CreatedTrip = self
            .api
            .post("/trips", Some(&request), Auth::User, "Failed to book ride")
            .await?;
        tracing::info!("Trip {} created with status {}", created.trip_id, created.status);
        Ok(created)
    }

    async fn get_trip(&self, trip_id: i64) -> Result<Trip, AppError> {
        self.api
            .get(&format!("/trips/{trip_id}"), Auth::User, "Failed to get trip details")
            .await
    }

    async fn cancel_trip(&self, trip_id: i64) -> Result<CancelledTrip, AppError> {
        tracing::info!("Cancelling trip: {}", trip_id);
        self.api
            .post::<(), _>(&format!("/trips/{trip_id}/cancel"), None, Auth::User, "Failed to cancel ride")
            .await
    }

    async fn generate_pickup_otp(&self, trip_id: i64) -> Result<PickupOtp, AppError> {
        self.api
            .post::<(), _>(
                &format!("/dispatch/rider/trips/{trip_id}/generate-otp"),
                None,
                Auth::User,
                "Failed to generate OTP",
            )
            .await
    }

    async fn get_active_trip(&self) -> Result<Option<Trip>, AppError> {
        let envelope: Option<ActiveTripEnvelope<Trip>> = self
            .api
            .get("/dispatch/rider/active-trip", Auth::User, "Failed to check active trip")
            .await?;
        Ok(envelope.and_then(|e| e.active_trip))
    }
}

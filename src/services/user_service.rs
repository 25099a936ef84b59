// src/services/user_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::SparrowError as AppError,
    models::user::{Capabilities, SendOtpRequest, SendOtpResponse, TokenGrant, VerifyOtpRequest},
    services::api_client::{ApiClient, Auth},
    session::Session,
};

#[async_trait]
pub trait UserOperations: Send + Sync {
    async fn get_capabilities(&self) -> Result<Capabilities, AppError>;
}

#[async_trait]
pub trait AuthOperations: Send + Sync {
    async fn send_otp(&self, phone_number: &str) -> Result<SendOtpResponse, AppError>;
    async fn verify_otp(&self, phone_number: &str, otp_code: &str) -> Result<TokenGrant, AppError>;
    async fn refresh(&self) -> Result<String, AppError>;
    async fn logout(&self) -> Result<(), AppError>;
}

pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UserOperations for UserService {
    async fn get_capabilities(&self) -> Result<Capabilities, AppError> {
        self.api
            .get("/me/capabilities", Auth::User, "Failed to fetch capabilities")
            .await
    }
}

/// OTP login. Tokens land in the session store under the fixed keys.
pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn session(&self) -> &Session {
        self.api.session()
    }
}

fn validate_phone(phone_number: &str) -> Result<String, AppError> {
    let trimmed = phone_number.trim();
    let digits = trimmed.trim_start_matches('+');
    if digits.len() < 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation_error("phone_number", "Enter a valid phone number"));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl AuthOperations for AuthService {
    async fn send_otp(&self, phone_number: &str) -> Result<SendOtpResponse, AppError> {
        let phone_number = validate_phone(phone_number)?;
        tracing::info!("Requesting login OTP");
        self.api
            .post(
                "/auth/send-otp",
                Some(&SendOtpRequest { phone_number }),
                Auth::None,
                "Failed to send OTP",
            )
            .await
    }

    async fn verify_otp(&self, phone_number: &str, otp_code: &str) -> Result<TokenGrant, AppError> {
        let phone_number = validate_phone(phone_number)?;
        let request = VerifyOtpRequest {
            phone_number,
            otp_code: otp_code.trim().to_string(),
        };
        let grant: TokenGrant = self
            .api
            .post("/auth/verify-otp", Some(&request), Auth::None, "Invalid OTP")
            .await?;
        self.session().store_grant(&grant)?;
        tracing::info!("Logged in");
        Ok(grant)
    }

    async fn refresh(&self) -> Result<String, AppError> {
        self.api.refresh_access_token().await
    }

    async fn logout(&self) -> Result<(), AppError> {
        let result: Result<Option<serde_json::Value>, AppError> = self
            .api
            .post::<(), _>("/auth/logout", None, Auth::Optional, "Failed to log out")
            .await;
        if let Err(err) = &result {
            tracing::warn!("Server logout failed, clearing local session anyway: {}", err);
        }
        self.session().clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert_eq!(validate_phone(" +919876543210 ").unwrap(), "+919876543210");
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98765abc10").is_err());
    }
}

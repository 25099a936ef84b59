// src/models/user.rs
use serde::{Deserialize, Serialize};

use crate::models::driver::ApprovalStatus;

/// Role claim carried in the access token. Only used to keep admin tokens out
/// of the rider/driver flow.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    User,          // Normal OTP-authenticated account
    Admin,         // Tenant administrator
    PlatformAdmin, // Platform operator
    Other(String),
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::PlatformAdmin)
    }
}

impl From<String> for UserRole {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "USER" | "RIDER" => UserRole::User,
            "ADMIN" => UserRole::Admin,
            "PLATFORM_ADMIN" => UserRole::PlatformAdmin,
            _ => UserRole::Other(raw),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => "USER".to_string(),
            UserRole::Admin => "ADMIN".to_string(),
            UserRole::PlatformAdmin => "PLATFORM_ADMIN".to_string(),
            UserRole::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CapabilityState {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
}

/// Response of `/me/capabilities`. Capabilities are not roles.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Capabilities {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "rider_default")]
    pub rider: bool,
    #[serde(default)]
    pub driver: CapabilityState,
    #[serde(default)]
    pub fleet_owner: CapabilityState,
}

fn rider_default() -> bool {
    true
}

// Auth Models
#[derive(Debug, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub phone_number: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SendOtpResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp_code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Unverified JWT payload fields the client reads.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct JwtClaims {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// src/services/api_client.rs
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    errors::{SparrowError, SparrowResult},
    models::user::{RefreshRequest, RefreshedToken},
    session::Session,
};

/// Seconds before `exp` at which the access token is refreshed up front.
const REFRESH_WINDOW_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Public endpoint, no token sent.
    None,
    /// Send the token if one is stored.
    Optional,
    /// Requires a stored, non-admin token.
    User,
}

/// Thin JSON transport over the backend. Every call either yields the decoded
/// body or one of the three failure kinds: transport, non-2xx with `detail`,
/// or a body that does not match the expected shape.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Session) -> SparrowResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
        default_message: &str,
    ) -> SparrowResult<T> {
        self.send(Method::GET, path, None, auth, default_message).await
    }

    /// GET where a 404 means "nothing there" rather than an error.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
        default_message: &str,
    ) -> SparrowResult<Option<T>> {
        match self.get(path, auth, default_message).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        auth: Auth,
        default_message: &str,
    ) -> SparrowResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| SparrowError::JsonSerialization(e.to_string()))?;
        self.send(Method::POST, path, body, auth, default_message).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
        default_message: &str,
    ) -> SparrowResult<T> {
        let token = self.bearer(auth).await?;
        self.execute(method, &self.url(path), body, token, default_message)
            .await
    }

    async fn bearer(&self, auth: Auth) -> SparrowResult<Option<String>> {
        match auth {
            Auth::None => Ok(None),
            Auth::Optional => self.session.access_token(),
            Auth::User => {
                let token = self.session.require_user_token()?;
                if self.session.access_token_expires_within(REFRESH_WINDOW_SECS) {
                    match self.refresh_access_token().await {
                        Ok(fresh) => return Ok(Some(fresh)),
                        Err(err) => {
                            tracing::warn!("Token refresh failed, using current token: {}", err);
                        }
                    }
                }
                Ok(Some(token))
            }
        }
    }

    /// Exchange the stored refresh token for a new access token and store it.
    pub async fn refresh_access_token(&self) -> SparrowResult<String> {
        let refresh_token = self
            .session
            .refresh_token()?
            .ok_or_else(|| SparrowError::unauthenticated("No refresh token stored"))?;
        let body = serde_json::to_value(RefreshRequest { refresh_token })
            .map_err(|e| SparrowError::JsonSerialization(e.to_string()))?;

        let refreshed: RefreshedToken = self
            .execute(
                Method::POST,
                &self.url("/auth/refresh"),
                Some(body),
                None,
                "Session expired. Please log in again",
            )
            .await?;
        self.session.store_access_token(&refreshed.access_token)?;
        tracing::info!("Access token refreshed");
        Ok(refreshed.access_token)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        token: Option<String>,
        default_message: &str,
    ) -> SparrowResult<T> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, "{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Request-ID", &request_id);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(request_id = %request_id, "{} {} failed: {}", method, url, e);
            SparrowError::from(e)
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(request_id = %request_id, "{} {} -> {}", method, url, status);
        }
        parse_body(status, &text, default_message)
    }
}

/// Turn a status and raw body into the decoded value or a classified error.
pub(crate) fn parse_body<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
    default_message: &str,
) -> SparrowResult<T> {
    let parsed: Result<Value, _> = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    };

    if !status.is_success() {
        let detail = parsed
            .ok()
            .and_then(|body| extract_detail(&body))
            .unwrap_or_else(|| default_message.to_string());
        return Err(SparrowError::api(status.as_u16(), detail));
    }

    let value = parsed.map_err(|e| SparrowError::MalformedResponse(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| SparrowError::MalformedResponse(e.to_string()))
}

/// `detail` is a string for handled errors and a list of `{msg}` objects for
/// request validation failures.
fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        status: String,
    }

    #[test]
    fn test_success_body_decodes() {
        let body: Body = parse_body(StatusCode::OK, r#"{"status": "ARRIVED"}"#, "x").unwrap();
        assert_eq!(body.status, "ARRIVED");
    }

    #[test]
    fn test_error_uses_detail() {
        let err = parse_body::<Body>(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Trip already cancelled"}"#,
            "Failed to cancel trip",
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Trip already cancelled");
    }

    #[test]
    fn test_error_without_detail_uses_default() {
        for body in ["", "<html>bad gateway</html>", r#"{"error": "x"}"#] {
            let err = parse_body::<Body>(StatusCode::BAD_GATEWAY, body, "Failed to fetch trip").unwrap_err();
            assert_eq!(err.to_string(), "Failed to fetch trip");
        }
    }

    #[test]
    fn test_validation_detail_list() {
        let err = parse_body::<Body>(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "otp"], "msg": "field required"}]}"#,
            "Failed",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "field required");
    }

    #[test]
    fn test_malformed_success_body() {
        let err = parse_body::<Body>(StatusCode::OK, "not json", "x").unwrap_err();
        assert!(matches!(err, SparrowError::MalformedResponse(_)));

        let err = parse_body::<Body>(StatusCode::OK, r#"{"unexpected": 1}"#, "x").unwrap_err();
        assert!(matches!(err, SparrowError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let value: Option<Body> = parse_body(StatusCode::OK, "", "x").unwrap();
        assert!(value.is_none());
    }
}

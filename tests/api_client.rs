//! HTTP layer against an in-process mock of the backend.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use sparrow_ride_client::{
    ClientConfig, ClientState, SparrowError,
    models::{TokenGrant, TripStatus},
    session::Session,
};
use std::sync::{Arc, Mutex};

fn token(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.sig")
}

fn user_token(expires_in: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + expires_in;
    token(json!({"user_id": 7, "role": "USER", "exp": exp, "token_type": "access"}))
}

#[derive(Clone, Default)]
struct Mock {
    /// (path, bearer token, had X-Request-ID)
    seen: Arc<Mutex<Vec<(String, Option<String>, bool)>>>,
    fresh_token: Arc<Mutex<String>>,
    online: Arc<Mutex<bool>>,
}

impl Mock {
    fn record(&self, path: &str, headers: &HeaderMap) {
        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        let has_request_id = headers.contains_key("x-request-id");
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), bearer, has_request_id));
    }

    fn seen(&self) -> Vec<(String, Option<String>, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn verify_otp(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("/auth/verify-otp", &headers);
    if body["otp_code"] != "123456" {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Invalid OTP"}))).into_response();
    }
    Json(json!({
        "access_token": user_token(3600),
        "refresh_token": "refresh-1",
        "expires_in": 3600,
        "user": {"user_id": 7}
    }))
    .into_response()
}

async fn refresh(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("/auth/refresh", &headers);
    if body["refresh_token"] != "refresh-1" {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid refresh token"}))).into_response();
    }
    let fresh = mock.fresh_token.lock().unwrap().clone();
    Json(json!({"access_token": fresh, "expires_in": 3600})).into_response()
}

async fn logout(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/auth/logout", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response()
}

async fn capabilities(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/me/capabilities", &headers);
    if !headers.contains_key("authorization") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))).into_response();
    }
    Json(json!({
        "user_id": 7,
        "rider": true,
        "driver": {"exists": true, "approval_status": "PENDING"},
        "fleet_owner": {"exists": false, "approval_status": null}
    }))
    .into_response()
}

async fn trip(State(mock): State<Mock>, headers: HeaderMap, Path(trip_id): Path<i64>) -> Response {
    mock.record(&format!("/trips/{trip_id}"), &headers);
    match trip_id {
        5 => Json(json!({
            "trip_id": 5,
            "status": "DRIVER_EN_ROUTE",
            "fare_amount": "149.50",
            "distance_km": "4.20",
            "pickup_location": {"lat": "12.9716", "lng": 77.5946},
            "driver": {"full_name": "Ravi Kumar", "phone_number": "+919876543210"}
        }))
        .into_response(),
        9 => (StatusCode::NOT_FOUND, Json(json!({"detail": "Trip not found"}))).into_response(),
        _ => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
    }
}

fn shift_body(status: &str) -> Value {
    json!({"shift_id": 3, "driver_id": 9, "status": status, "started_at": "2026-10-19T07:30:00"})
}

async fn driver_me(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/driver/me", &headers);
    Json(json!({"driver_id": 9, "full_name": "Ravi Kumar", "approval_status": "APPROVED"})).into_response()
}

async fn go_online(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/driver/availability/online", &headers);
    *mock.online.lock().unwrap() = true;
    Json(shift_body("ONLINE")).into_response()
}

async fn go_offline(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/driver/availability/offline", &headers);
    *mock.online.lock().unwrap() = false;
    Json(shift_body("OFFLINE")).into_response()
}

// The backend answers 200 either way; no shift means null fields.
async fn active_shift(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/driver/shift/active", &headers);
    let body = if *mock.online.lock().unwrap() {
        json!({
            "is_online": true,
            "shift_id": 3,
            "shift_status": "ONLINE",
            "vehicle_id": 12,
            "vehicle_registration": "KA01AB1234",
            "fleet_name": null,
            "assignment_start": "2026-10-19T07:29:00",
            "started_at": "2026-10-19T07:30:00"
        })
    } else {
        json!({
            "is_online": false,
            "shift_id": null,
            "shift_status": null,
            "vehicle_id": null,
            "vehicle_registration": null,
            "fleet_name": null,
            "assignment_start": null,
            "started_at": null
        })
    };
    Json(body).into_response()
}

async fn driver_active_trip(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/dispatch/driver/trips/active", &headers);
    Json(json!({"active_trip": null})).into_response()
}

async fn pending_dispatches(State(mock): State<Mock>, headers: HeaderMap) -> Response {
    mock.record("/dispatch/driver/dispatches/pending", &headers);
    Json(json!({
        "pending_dispatches": [{
            "dispatch_id": 31,
            "trip_id": 5,
            "pickup_lat": "12.9716",
            "pickup_lng": "77.5946",
            "rider_name": "Likhitha M.",
            "estimated_distance_km": "1.8",
            "sent_at": "2026-10-19T08:15:00",
            "expires_in_seconds": 0
        }],
        "total": 1
    }))
    .into_response()
}

async fn verify_pickup(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("/dispatch/driver/trips/5/verify-otp", &headers);
    if body["otp"] == "482913" {
        Json(json!({"message": "OTP verified", "verified": true})).into_response()
    } else {
        Json(json!({"message": "Incorrect OTP", "verified": false})).into_response()
    }
}

async fn spawn_backend() -> (Mock, String) {
    let mock = Mock::default();
    let api = Router::new()
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/me/capabilities", get(capabilities))
        .route("/trips/:trip_id", get(trip))
        .route("/driver/me", get(driver_me))
        .route("/driver/availability/online", post(go_online))
        .route("/driver/availability/offline", post(go_offline))
        .route("/driver/shift/active", get(active_shift))
        .route("/dispatch/driver/trips/active", get(driver_active_trip))
        .route("/dispatch/driver/dispatches/pending", get(pending_dispatches))
        .route("/dispatch/driver/trips/5/verify-otp", post(verify_pickup))
        .with_state(mock.clone());
    let app = Router::new().nest("/api/v2", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, format!("http://{addr}/api/v2/"))
}

fn client(base_url: &str) -> ClientState {
    let config = ClientConfig::default().with_base_url(base_url);
    ClientState::with_session(config, Session::in_memory()).unwrap()
}

async fn logged_in() -> (Mock, ClientState) {
    let (mock, url) = spawn_backend().await;
    let state = client(&url);
    state
        .auth_service
        .verify_otp("+919876543210", "123456")
        .await
        .unwrap();
    (mock, state)
}

#[tokio::test]
async fn test_login_stores_tokens_and_sends_bearer() {
    let (mock, state) = logged_in().await;
    assert!(state.session.is_authenticated());
    assert_eq!(state.session.refresh_token().unwrap().as_deref(), Some("refresh-1"));

    let caps = state.user_service.get_capabilities().await.unwrap();
    assert!(caps.driver.exists);

    let seen = mock.seen();
    let (path, bearer, has_request_id) = seen.last().unwrap();
    assert_eq!(path, "/me/capabilities");
    assert_eq!(bearer, &state.session.access_token().unwrap());
    assert!(has_request_id);

    // Public endpoint never carries a token
    assert_eq!(seen[0].1, None);
}

#[tokio::test]
async fn test_wrong_login_otp_uses_detail() {
    let (_mock, url) = spawn_backend().await;
    let state = client(&url);
    let err = state
        .auth_service
        .verify_otp("+919876543210", "000000")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid OTP");
    assert!(!state.session.is_authenticated());
}

#[tokio::test]
async fn test_error_detail_and_default_message() {
    let (_mock, state) = logged_in().await;

    let err = state.rider_service.get_trip(9).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Trip not found");

    let err = state.rider_service.get_trip(13).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "Failed to get trip details");
}

#[tokio::test]
async fn test_decimal_strings_decode() {
    let (_mock, state) = logged_in().await;
    let trip = state.rider_service.get_trip(5).await.unwrap();
    assert_eq!(trip.status, TripStatus::DriverEnRoute);
    assert_eq!(trip.fare_amount, Some(149.5));
    assert_eq!(trip.distance_km, Some(4.2));
    assert_eq!(trip.pickup_location.unwrap().lat, Some(12.9716));
}

#[tokio::test]
async fn test_missing_resources_are_none() {
    let (_mock, state) = logged_in().await;
    assert!(state.driver_service.get_active_shift().await.unwrap().is_none());
    assert!(state.driver_service.get_active_trip().await.unwrap().is_none());
}

#[tokio::test]
async fn test_dashboard_follows_shift_through_go_offline() {
    let (mock, state) = logged_in().await;
    *mock.online.lock().unwrap() = true;

    let dashboard = state.dashboard();
    dashboard.mount().await.unwrap();
    let shift = dashboard.shift().unwrap();
    assert_eq!(shift.vehicle_registration.as_deref(), Some("KA01AB1234"));
    assert_eq!(dashboard.shift_view().label, "ONLINE");

    dashboard.go_offline().await.unwrap();
    let view = dashboard.shift_view();
    assert_eq!(view.label, "OFFLINE");
    assert_eq!(view.toggle_label, "Go Online");
    assert!(dashboard.shift().is_none());
    assert!(dashboard.store().snapshot().error.is_none());

    dashboard.toggle_shift().await.unwrap();
    assert_eq!(dashboard.shift_view().label, "ONLINE");
}

#[tokio::test]
async fn test_pending_dispatch_accepts_dispatch_id() {
    let (_mock, state) = logged_in().await;
    let dispatches = state.driver_service.get_pending_dispatches().await.unwrap();
    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0].attempt_id, 31);
    assert!(dispatches[0].is_expired());
    assert!(dispatches[0].sent_at.is_some());
}

#[tokio::test]
async fn test_rejected_pickup_otp_is_error() {
    let (_mock, state) = logged_in().await;
    let err = state
        .driver_service
        .verify_pickup_otp(5, "111111")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Incorrect OTP");

    let ok = state.driver_service.verify_pickup_otp(5, "482913").await.unwrap();
    assert_eq!(ok.verified, Some(true));
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_first() {
    let (mock, url) = spawn_backend().await;
    let fresh = user_token(3600);
    *mock.fresh_token.lock().unwrap() = fresh.clone();

    let state = client(&url);
    state
        .session
        .store_grant(&TokenGrant {
            access_token: user_token(5),
            refresh_token: "refresh-1".to_string(),
            expires_in: Some(5),
            user: None,
        })
        .unwrap();

    state.user_service.get_capabilities().await.unwrap();

    let seen = mock.seen();
    assert_eq!(seen[0].0, "/auth/refresh");
    assert_eq!(seen[1].0, "/me/capabilities");
    assert_eq!(seen[1].1.as_deref(), Some(fresh.as_str()));
    assert_eq!(state.session.access_token().unwrap(), Some(fresh));
}

#[tokio::test]
async fn test_admin_token_never_reaches_server() {
    let (mock, url) = spawn_backend().await;
    let state = client(&url);
    state
        .session
        .store_access_token(&token(json!({"user_id": 1, "role": "ADMIN"})))
        .unwrap();

    let err = state.user_service.get_capabilities().await.unwrap_err();
    assert!(matches!(err, SparrowError::AdminSession));
    assert!(mock.seen().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_even_on_server_error() {
    let (mock, state) = logged_in().await;
    state.auth_service.logout().await.unwrap();
    assert!(!state.session.is_authenticated());
    assert!(state.session.refresh_token().unwrap().is_none());
    assert_eq!(mock.seen().last().unwrap().0, "/auth/logout");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let state = client("http://127.0.0.1:1/api/v2");
    state.session.store_access_token(&user_token(3600)).unwrap();
    let err = state.rider_service.get_trip(5).await.unwrap_err();
    assert!(err.status().is_none());
    assert!(matches!(
        err,
        SparrowError::NetworkConnection(_) | SparrowError::NetworkTimeout | SparrowError::HttpClient(_)
    ));
}

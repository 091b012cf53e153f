//! Shared helpers for the gateway and workflow integration tests

#![allow(dead_code, unreachable_pub)]

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use std::sync::{Arc, Once};
use superadmin_console::ApiClient;
use superadmin_core::config::{ApiConfig, SessionConfig};
use superadmin_core::{MemoryStore, Session};
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// An unsigned token whose payload carries `claims`
pub fn token_with_claims(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// A token identifying `email`
pub fn token_for(email: &str) -> String {
    token_with_claims(&json!({ "email": email, "role": "SUPER_ADMIN" }))
}

/// A session holding `token` under the default key
pub fn session_with_token(token: &str) -> Arc<Session> {
    let store = MemoryStore::with_values([("jwt_token", format!("Bearer {token}"))]);
    Arc::new(Session::new(Arc::new(store), &SessionConfig::default()))
}

/// A gateway client pointed at `server`
pub fn client_for(server: &MockServer, session: Arc<Session>) -> ApiClient {
    client_at(&server.uri(), session)
}

/// A gateway client pointed at `base_url` with short timeouts
pub fn client_at(base_url: &str, session: Arc<Session>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
    };
    ApiClient::new(&config, session).unwrap()
}

/// Admin registration as the server sends it
pub fn admin_json(id: i64) -> Value {
    json!({
        "adminId": id,
        "adminName": format!("Admin {id}"),
        "adminEmail": format!("admin{id}@hotels.lk"),
        "adminPhoneNumber": "0771234567"
    })
}

/// Hotel as the server sends it
pub fn hotel_json(id: i64, name: &str, district: &str) -> Value {
    json!({
        "hotelId": id,
        "hotelName": name,
        "hotelAddress": format!("{id} Galle Road"),
        "district": district,
        "hotelRating": 4.5,
        "createdAt": "2024-01-15T10:30:00Z",
        "amenities": [{ "name": "Pool" }, "WiFi"]
    })
}

/// Carousel image as the server sends it
pub fn image_json(id: i64, state: &str) -> Value {
    json!({
        "carouselImageId": id,
        "carouselImageBase64": "AAAA",
        "state": state
    })
}

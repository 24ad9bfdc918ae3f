#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use httpmock::MockServer;
use rental_client::domain::model::StoredCredentials;
use rental_client::{ApiClient, ClientConfig, MemoryCredentialStore, RecordingNavigator, SessionManager};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn token_expiring_at(label: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "u1", "jti": label, "exp": exp }).to_string());
    format!("{}.{}.sig-{}", header, payload, label)
}

pub fn fresh_token(label: &str) -> String {
    token_expiring_at(label, chrono::Utc::now().timestamp() + 3600)
}

pub fn expired_token(label: &str) -> String {
    token_expiring_at(label, chrono::Utc::now().timestamp() - 60)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn ok(data: Value) -> Value {
    json!({ "success": true, "message": "ok", "data": data })
}

pub fn failure(message: &str) -> Value {
    json!({ "success": false, "message": message, "error": "REQUEST_FAILED" })
}

pub fn user_json(roles: &[&str]) -> Value {
    json!({
        "id": "u1",
        "email": "maria@example.com",
        "firstName": "Maria",
        "lastName": "Santos",
        "roles": roles
    })
}

pub fn apartment_json(id: &str, city: &str, price: f64) -> Value {
    json!({
        "id": id,
        "title": format!("Apartment {}", id),
        "address": "12 Rua Nova",
        "city": city,
        "price": price,
        "bedrooms": 2,
        "bathrooms": 1,
        "available": true,
        "images": ["a.jpg", "b.jpg"]
    })
}

pub fn page_json(items: Vec<Value>, page: u32, total: u64) -> Value {
    let count = items.len();
    json!({
        "items": items,
        "total": total,
        "page": page,
        "limit": 10,
        "totalPages": (total as f64 / 10.0).ceil() as u32,
        "count": count
    })
}

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryCredentialStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub client: Arc<ApiClient>,
    pub session: SessionManager,
}

pub fn harness(credentials: StoredCredentials) -> Harness {
    let server = MockServer::start();
    let store = Arc::new(MemoryCredentialStore::with_credentials(credentials));
    let navigator = Arc::new(RecordingNavigator::new());
    let config = ClientConfig::new(server.base_url());
    let client = Arc::new(
        ApiClient::new(&config, store.clone(), navigator.clone()).expect("client should build"),
    );
    let session = SessionManager::new(client.clone());

    Harness {
        server,
        store,
        navigator,
        client,
        session,
    }
}

pub fn with_access(access: &str, refresh: Option<&str>) -> StoredCredentials {
    StoredCredentials {
        access_token: Some(access.to_string()),
        refresh_token: refresh.map(str::to_string),
        cookie_token: None,
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use cookie::Cookie;
use kreditscore_auth::{
    ApiClient, AuthController, ClientConfig, CookieBackend, MemoryCookieJar, MemoryNavigator,
    SessionStore,
};
use wiremock::MockServer;

pub const SITE: &str = "http://localhost:3000/";

pub struct Harness {
    pub controller: AuthController,
    pub navigator: Arc<MemoryNavigator>,
}

impl Harness {
    pub fn session(&self) -> &SessionStore {
        self.controller.api().session()
    }

    pub fn api(&self) -> &ApiClient {
        self.controller.api()
    }
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri().parse().unwrap()).with_timeout(Duration::from_secs(5))
}

pub fn harness(server: &MockServer, start: &str) -> Harness {
    harness_with(config_for(server), start, MemoryCookieJar::new())
}

pub fn harness_with(config: ClientConfig, start: &str, jar: impl CookieBackend) -> Harness {
    let session = Arc::new(SessionStore::new(&config, jar));
    let navigator = Arc::new(MemoryNavigator::new(start.parse().unwrap()));
    let api = ApiClient::new(config, session, navigator.clone()).unwrap();
    Harness {
        controller: AuthController::new(Arc::new(api)),
        navigator,
    }
}

/// Cookie store that accepts writes and silently keeps nothing.
pub struct BlackHoleJar;

impl CookieBackend for BlackHoleJar {
    fn get(&self, _name: &str) -> Option<Cookie<'static>> {
        None
    }

    fn set(&self, _cookie: Cookie<'static>) {}

    fn remove(&self, _name: &str) {}
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "telegram_id": 123456789,
        "phone_number": "+79991234567",
        "first_name": "Ivan",
        "username": "ivan",
        "loan_amount": 100000,
        "loan_term": 12,
        "loan_purpose": "Образование",
        "monthly_income": 50000,
        "created_at": "2024-01-15T10:30:00"
    })
}

pub fn sessions_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 10,
            "user_id": 1,
            "ip_address": "10.0.0.1",
            "user_agent": "Mozilla/5.0",
            "device_info": "Firefox on Linux",
            "created_at": "2024-01-15T10:30:00",
            "is_active": true
        },
        {
            "id": 11,
            "user_id": 1,
            "ip_address": "10.0.0.2",
            "created_at": "2024-01-10T08:00:00",
            "is_active": false
        }
    ])
}

pub fn device_json() -> serde_json::Value {
    serde_json::json!({
        "device_info": "Firefox on Linux",
        "ip_address": "10.0.0.1"
    })
}

//! Common test utilities for noteleaf integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use noteleaf_core::UserId;
use noteleaf_service::{create_router, AppState, ServiceConfig};
use noteleaf_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id,
            service_api_key,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get an auth header for an arbitrary user.
    pub fn auth_header_for(user_id: UserId) -> String {
        format!("Bearer test-token:{user_id}")
    }

    /// Create a profile for the default test user.
    pub async fn create_profile(&self) {
        self.server
            .post("/v1/profile")
            .add_header("authorization", self.user_auth_header())
            .json(&json!({}))
            .await
            .assert_status_ok();
    }

    /// Create a profile for an arbitrary user.
    pub async fn create_profile_for(&self, user_id: UserId) {
        self.server
            .post("/v1/profile")
            .add_header("authorization", Self::auth_header_for(user_id))
            .json(&json!({}))
            .await
            .assert_status_ok();
    }

    /// Record an action for a user via the service endpoint.
    pub async fn record_action(&self, user_id: UserId, action: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/v1/actions")
            .add_header("x-api-key", self.service_api_key.clone())
            .json(&json!({ "user_id": user_id.to_string(), "action": action }))
            .await;

        response.assert_status_ok();
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

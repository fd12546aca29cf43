//! Shared helpers for API integration tests: build the production router
//! against a test database and mint tokens for each role.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use collegium_api::auth::jwt::{generate_access_token, JwtConfig};
use collegium_api::config::ServerConfig;
use collegium_api::router::build_app_router;
use collegium_api::state::AppState;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-entropy".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub fn test_router(pool: PgPool) -> (Router, ServerConfig) {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(collegium_events::EventBus::default()),
    };
    (build_app_router(state, &config), config)
}

pub fn token_for(config: &ServerConfig, user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &config.jwt).expect("token generation")
}

use std::time::Duration;

use axum::extract::State;
use kalanow_store::{
    config::{AppConfig, DbConfig},
    db::Db,
    routes::health::health_check,
    state::AppState,
};

fn offline_state() -> AppState {
    let db_config = DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout: Duration::from_millis(200),
        ..DbConfig::default()
    };
    let config = AppConfig::from_lookup(|_| None);
    AppState::new(Db::connect_lazy(&db_config), config)
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check(State(offline_state())).await;
    assert!(response.0.success);

    let data = serde_json::to_value(response.0.data.expect("health data")).unwrap();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["pool"]["acquired"], 0);
    assert_eq!(data["pool"]["released"], 0);
}

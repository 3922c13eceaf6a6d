//! Router-level behavior that needs no live database.

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use kalanow_store::{
    config::{AppConfig, DbConfig},
    db::Db,
    error::msg,
    routes::create_api_router,
    session::{self, Scope},
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn app() -> Router {
    let db_config = DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout: Duration::from_millis(200),
        ..DbConfig::default()
    };
    let config = AppConfig::from_lookup(|key| match key {
        "SESSION_SECRET" => Some(SECRET.to_string()),
        "PAYMENT_DELAY_MS" => Some("0".to_string()),
        _ => None,
    });
    let state = AppState::new(Db::connect_lazy(&db_config), config);
    Router::new().nest("/api", create_api_router()).with_state(state)
}

async fn send(request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap(), cookie)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn with_cookie(uri: &str, cookie: String) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn anonymous_session_is_signed_out() {
    let (status, body, _) = send(get("/api/auth/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": { "user": null, "profile_complete": false, "loading": false }
        })
    );
}

#[tokio::test]
async fn admin_routes_require_the_admin_cookie() {
    let (status, body, _) = send(get("/api/admin/banners")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], msg::LOGIN_REQUIRED);

    // A storefront session does not open the back office.
    let user = session::issue(SECRET, 5, "user", Scope::Storefront, 1).unwrap();
    let (status, _, _) = send(with_cookie("/api/admin/banners", format!("session={}", user.token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_cookie_with_user_role_is_forbidden() {
    let token = session::issue(SECRET, 5, "user", Scope::Admin, 1).unwrap().token;
    let (status, body, _) =
        send(with_cookie("/api/admin/users", format!("admin_session={token}"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");
}

#[tokio::test]
async fn otp_session_of_an_admin_does_not_pass_as_admin_cookie() {
    // An admin who signed in by phone code holds a storefront token with role admin.
    let token = session::issue(SECRET, 1, "admin", Scope::Storefront, 1).unwrap().token;
    let (status, body, _) =
        send(with_cookie("/api/admin/users", format!("admin_session={token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], msg::LOGIN_REQUIRED);
}

#[tokio::test]
async fn admin_token_is_not_a_storefront_session() {
    let token = session::issue(SECRET, 1, "admin", Scope::Admin, 1).unwrap().token;
    let (status, _, _) = send(with_cookie("/api/tickets", format!("session={token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body, _) = send(with_cookie("/api/auth/session", format!("session={token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"], Value::Null);
}

#[tokio::test]
async fn tampered_cookie_is_rejected() {
    let (status, _, _) = send(with_cookie("/api/tickets", "session=forged.token.value".into())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookies() {
    let (status, body, cookie) = send(
        Request::post("/api/admin/logout").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(cookie.as_deref(), Some(session::clear_cookie(session::ADMIN_COOKIE).as_str()));

    let (_, body, cookie) =
        send(Request::post("/api/auth/logout").body(Body::empty()).unwrap()).await;
    assert_eq!(body, json!({ "success": true }));
    assert!(cookie.unwrap().starts_with("session=;"));
}

#[tokio::test]
async fn page_lookup_without_database_is_a_server_error() {
    let (status, body, _) = send(get("/api/pages/about")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], msg::PAGE_FAILED);
    assert_eq!(body["kind"], "database");
}

#[tokio::test]
async fn payment_endpoint_returns_a_gateway_result() {
    let request = Request::post("/api/payments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"amount":150000,"paymentMethod":"gateway"}"#))
        .unwrap();
    let (status, body, _) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let status = body["data"]["status"].as_str().unwrap();
    assert!(status == "Success" || status == "Failed");
    assert!(body["data"]["transactionId"].is_string());
}

#[tokio::test]
async fn invalid_phone_is_rejected_before_touching_the_database() {
    let request = Request::post("/api/auth/otp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"phone":"12345"}"#))
        .unwrap();
    let (status, body, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg::INVALID_PHONE);
}

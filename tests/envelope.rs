use axum::{http::StatusCode, response::IntoResponse};
use kalanow_store::{
    error::{ActionError, ActionResult, AppError, ErrorKind, msg},
    response::Deleted,
};
use serde_json::json;

#[test]
fn success_serializes_with_data_only() {
    let result = ActionResult::Success(Deleted { id: 7 });
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "success": true, "data": { "id": 7 } })
    );
}

#[test]
fn failure_serializes_message_and_kind() {
    let result: ActionResult<Deleted> =
        ActionResult::Failure(ActionError::new(ErrorKind::NotFound, msg::PAGE_NOT_FOUND));
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "success": false,
            "error": "صفحه یافت نشد یا غیرفعال است.",
            "kind": "not_found"
        })
    );
}

#[test]
fn driver_errors_are_replaced_by_the_fallback() {
    let result: ActionResult<()> =
        ActionResult::settle(Err(AppError::DbError(sqlx::Error::PoolTimedOut)), "test", msg::BANNERS_FAILED);
    let err = result.error().expect("failure");
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(err.message, msg::BANNERS_FAILED);
}

#[test]
fn domain_errors_keep_their_message() {
    let not_found: ActionResult<()> =
        ActionResult::settle(Err(AppError::NotFound(msg::PAGE_NOT_FOUND)), "test", msg::PAGE_FAILED);
    assert_eq!(not_found.error().map(|e| e.message.as_str()), Some(msg::PAGE_NOT_FOUND));

    let invalid: ActionResult<()> =
        ActionResult::settle(Err(AppError::bad_request(msg::INVALID_SLUG)), "test", msg::SAVE_FAILED);
    assert_eq!(invalid.error().map(|e| e.kind), Some(ErrorKind::Invalid));

    let forbidden: ActionResult<()> = ActionResult::settle(Err(AppError::Forbidden), "test", msg::LOAD_FAILED);
    assert_eq!(forbidden.error().map(|e| e.message.as_str()), Some(msg::ACCESS_DENIED));
}

#[test]
fn status_follows_error_kind() {
    let cases = [
        (ErrorKind::NotFound, StatusCode::NOT_FOUND),
        (ErrorKind::Invalid, StatusCode::BAD_REQUEST),
        (ErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
        (ErrorKind::Forbidden, StatusCode::FORBIDDEN),
        (ErrorKind::Database, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (kind, status) in cases {
        let response = ActionResult::<()>::Failure(ActionError::new(kind, "x")).into_response();
        assert_eq!(response.status(), status, "{kind:?}");
    }
    assert_eq!(ActionResult::Success(1).into_response().status(), StatusCode::OK);
}

#[test]
fn map_preserves_failure() {
    let failed: ActionResult<i32> =
        ActionResult::Failure(ActionError::new(ErrorKind::Invalid, "bad"));
    let mapped = failed.map(|n| n * 2);
    assert!(!mapped.is_success());
    assert_eq!(ActionResult::Success(2).map(|n| n * 2).data(), Some(&4));
}

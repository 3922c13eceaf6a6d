//! Connections are handed back on every exit path, including failures.

use std::time::Duration;

use kalanow_store::{
    config::DbConfig,
    db::Db,
    error::{ActionResult, ErrorKind, msg},
    routes::params::{AdminListQuery, CategoryFilter},
    services::{banner_service, category_service, coupon_service, page_service, user_service},
};

fn unreachable_db() -> Db {
    let config = DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout: Duration::from_millis(200),
        ..DbConfig::default()
    };
    Db::connect_lazy(&config)
}

#[tokio::test]
async fn unreachable_database_yields_localized_failure() {
    let db = unreachable_db();

    match banner_service::fetch_banners_client(&db).await {
        ActionResult::Failure(err) => {
            assert_eq!(err.kind, ErrorKind::Database);
            assert_eq!(err.message, msg::BANNERS_FAILED);
        }
        ActionResult::Success(_) => panic!("expected a failure without a database"),
    }

    let categories =
        category_service::fetch_active_categories_client(&db, &CategoryFilter::default()).await;
    let err = categories.into_result().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(err.message, msg::CATEGORIES_FAILED);
}

#[tokio::test]
async fn connectivity_failure_is_distinct_from_missing_page() {
    let db = unreachable_db();
    let err = page_service::fetch_info_page_by_slug(&db, "nonexistent-slug")
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(err.message, msg::PAGE_FAILED);
    assert_ne!(err.message, msg::PAGE_NOT_FOUND);
}

#[tokio::test]
async fn failed_checkouts_leave_counters_balanced() {
    let db = unreachable_db();
    for _ in 0..3 {
        let result = banner_service::fetch_banners_client(&db).await;
        assert!(!result.is_success());
    }
    let counters = db.stats();
    assert_eq!(counters.acquired, counters.released);
    assert_eq!(counters.in_use(), 0);
}

#[tokio::test]
async fn orm_actions_are_counted_and_released() {
    let db = unreachable_db();

    let coupons = coupon_service::list_coupons(&db, AdminListQuery::default()).await;
    assert_eq!(coupons.into_result().unwrap_err().kind, ErrorKind::Database);
    let users = user_service::list_users(&db, AdminListQuery::default()).await;
    assert_eq!(users.into_result().unwrap_err().message, msg::LOAD_FAILED);

    let counters = db.stats();
    assert_eq!(counters.acquired, 2);
    assert_eq!(counters.released, 2);
}

#[tokio::test]
async fn held_orm_lease_shows_as_in_use() {
    let db = unreachable_db();
    let lease = db.orm();
    assert_eq!(db.stats().in_use(), 1);
    drop(lease);
    let counters = db.stats();
    assert_eq!(counters.in_use(), 0);
    assert_eq!(counters.acquired, 1);
}

#[tokio::test]
async fn ping_reports_failure_without_panicking() {
    let db = unreachable_db();
    assert!(!db.ping().await);
}

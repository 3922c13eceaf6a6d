use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use kalanow_store::{
    config::AppConfig,
    db::{Db, run_migrations},
    dto::{
        auth::{OtpRequest, ProfileRequest, VerifyOtpRequest},
        banners::BannerInput,
        categories::CategoryInput,
        coupons::{CouponCheckRequest, CouponInput},
        pages::InfoPageInput,
    },
    entity::otp_codes,
    error::{ErrorKind, msg},
    middleware::auth::AuthUser,
    routes::params::{CategoryFilter, CategoryQuery},
    services::{auth_service, banner_service, category_service, coupon_service, page_service},
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use sqlx::mysql::MySqlPoolOptions;

// Integration flow against a real MySQL database. Every table is emptied first.
#[tokio::test]
async fn storefront_and_admin_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL to run the storefront flow.");
            return Ok(());
        }
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let db = Db::from_pool(pool);
    run_migrations(&db).await?;
    reset(&db).await?;

    banners_are_active_and_ordered(&db).await?;
    top_level_categories_respect_limit(&db).await?;
    category_cycles_are_rejected(&db).await?;
    missing_page_has_its_own_message(&db).await?;
    coupon_quotes(&db).await?;
    otp_sign_in(&db).await?;
    otp_locks_after_repeated_failures(&db).await?;
    otp_resend_is_throttled(&db).await?;
    failed_queries_release_connections(&db).await?;

    let counters = db.stats();
    assert_eq!(counters.acquired, counters.released);
    Ok(())
}

async fn reset(db: &Db) -> anyhow::Result<()> {
    let mut conn = db.acquire().await?;
    sqlx::query("UPDATE categories SET parent_id = NULL").execute(&mut *conn).await?;
    for table in [
        "support_tickets",
        "sms_campaigns",
        "otp_codes",
        "coupons",
        "products",
        "categories",
        "info_pages",
        "banners",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}")).execute(&mut *conn).await?;
    }
    Ok(())
}

fn banner(title: &str, order: i32, is_active: bool) -> BannerInput {
    BannerInput {
        title: title.into(),
        description: None,
        image_url: "https://picsum.photos/1200/400".into(),
        mobile_image_url: None,
        link: None,
        order,
        is_active,
    }
}

async fn banners_are_active_and_ordered(db: &Db) -> anyhow::Result<()> {
    for (title, order, active) in [("c", 3, true), ("a", 1, true), ("hidden", 0, false), ("b", 2, true)] {
        assert!(banner_service::create_banner(db, banner(title, order, active)).await.is_success());
    }

    let rejected = banner_service::create_banner(db, BannerInput {
        image_url: "https://example.com/x.png".into(),
        ..banner("bad", 9, true)
    })
    .await;
    assert_eq!(rejected.error().map(|e| e.message.as_str()), Some(msg::INVALID_IMAGE_HOST));

    let banners = banner_service::fetch_banners_client(db).await.into_result().unwrap();
    let titles: Vec<&str> = banners.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["a", "b", "c"]);
    assert!(banners.iter().all(|b| b.is_active));
    assert!(banners.windows(2).all(|w| w[0].order <= w[1].order));
    Ok(())
}

fn category(name: &str, slug: &str, parent_id: Option<i64>, order: i32) -> CategoryInput {
    CategoryInput {
        name: name.into(),
        slug: slug.into(),
        description: None,
        image_url: None,
        parent_id,
        order,
        is_active: true,
    }
}

async fn top_level_categories_respect_limit(db: &Db) -> anyhow::Result<()> {
    for order in (1..=5).rev() {
        let created = category_service::create_category(
            db,
            category(&format!("top {order}"), &format!("top-{order}"), None, order),
        )
        .await;
        assert!(created.is_success());
    }
    let inactive = CategoryInput {
        is_active: false,
        ..category("hidden", "hidden", None, 0)
    };
    assert!(category_service::create_category(db, inactive).await.is_success());

    let duplicate = category_service::create_category(db, category("again", "top-1", None, 9)).await;
    assert_eq!(duplicate.error().map(|e| e.message.as_str()), Some(msg::SLUG_TAKEN));

    let filter = CategoryFilter::default().with_parent(None).with_limit(2);
    let two = category_service::fetch_active_categories_client(db, &filter)
        .await
        .into_result()
        .unwrap();
    let slugs: Vec<&str> = two.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, ["top-1", "top-2"]);

    // Hostile sort input is coerced, never fails.
    let coerced = CategoryFilter::from_query(&CategoryQuery {
        limit: Some("10".into()),
        parent_id: None,
        sort_by: Some("id; DROP TABLE categories".into()),
        sort_order: Some("sideways".into()),
    });
    let all = category_service::fetch_active_categories_client(db, &coerced)
        .await
        .into_result()
        .unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(|c| c.is_active));
    assert!(all.windows(2).all(|w| w[0].order <= w[1].order));
    Ok(())
}

async fn category_cycles_are_rejected(db: &Db) -> anyhow::Result<()> {
    let parent = category_service::fetch_category_by_slug(db, "top-1")
        .await
        .into_result()
        .unwrap();
    let parent_id: i64 = parent.id.parse()?;

    let child = category_service::create_category(db, category("child", "child", Some(parent_id), 1))
        .await
        .into_result()
        .unwrap();
    let child_id: i64 = child.id.parse()?;

    let children = category_service::fetch_active_categories_client(
        db,
        &CategoryFilter::default().with_parent(Some(parent_id)),
    )
    .await
    .into_result()
    .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].parent_id.as_deref(), Some(parent.id.as_str()));

    let cycle = category_service::update_category(
        db,
        parent_id,
        category("top 1", "top-1", Some(child_id), 1),
    )
    .await;
    let err = cycle.into_result().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Invalid);
    assert_eq!(err.message, msg::CATEGORY_CYCLE);

    let missing_parent =
        category_service::update_category(db, child_id, category("child", "child", Some(-1), 1)).await;
    assert_eq!(missing_parent.error().map(|e| e.message.as_str()), Some(msg::INVALID_PARENT));

    let tree = category_service::fetch_category_tree(db).await.into_result().unwrap();
    let node = tree.iter().find(|n| n.category.id == parent.id).unwrap();
    assert_eq!(node.children.len(), 1);
    Ok(())
}

async fn missing_page_has_its_own_message(db: &Db) -> anyhow::Result<()> {
    let missing = page_service::fetch_info_page_by_slug(db, "nonexistent-slug").await;
    let err = missing.into_result().unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "صفحه یافت نشد یا غیرفعال است.");

    let draft = InfoPageInput {
        slug: "draft".into(),
        title: "پیش‌نویس".into(),
        content: "<p>...</p>".into(),
        meta_title: None,
        meta_description: None,
        is_active: false,
    };
    assert!(page_service::create_page(db, draft).await.is_success());
    let hidden = page_service::fetch_info_page_by_slug(db, "draft").await;
    assert_eq!(hidden.error().map(|e| e.kind), Some(ErrorKind::NotFound));

    let about = InfoPageInput {
        slug: "about".into(),
        title: "درباره ما".into(),
        content: "<p>سلام</p>".into(),
        meta_title: Some("درباره".into()),
        meta_description: None,
        is_active: true,
    };
    assert!(page_service::create_page(db, about).await.is_success());
    let page = page_service::fetch_info_page_by_slug(db, "about")
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.title, "درباره ما");
    Ok(())
}

async fn coupon_quotes(db: &Db) -> anyhow::Result<()> {
    let input = CouponInput {
        code: "autumn10".into(),
        discount_type: "percent".into(),
        discount_value: 10,
        min_order_amount: Some(100_000),
        max_uses: None,
        expires_at: Some(Utc::now() + Duration::days(7)),
        is_active: true,
    };
    let coupon = coupon_service::create_coupon(db, input.clone())
        .await
        .into_result()
        .unwrap();
    assert_eq!(coupon.code, "AUTUMN10");

    let duplicate = coupon_service::create_coupon(db, input).await;
    assert_eq!(duplicate.error().map(|e| e.message.as_str()), Some(msg::CODE_TAKEN));

    let quote = coupon_service::check_coupon(
        db,
        CouponCheckRequest {
            code: "Autumn10".into(),
            order_amount: 250_000,
        },
    )
    .await
    .into_result()
    .unwrap();
    assert_eq!(quote.discount_amount, 25_000);
    assert_eq!(quote.payable_amount, 225_000);

    let too_small = coupon_service::check_coupon(
        db,
        CouponCheckRequest {
            code: "AUTUMN10".into(),
            order_amount: 50_000,
        },
    )
    .await;
    assert_eq!(too_small.error().map(|e| e.message.as_str()), Some(msg::COUPON_MIN_ORDER));
    Ok(())
}

fn flow_config() -> AppConfig {
    AppConfig::from_lookup(|key| (key == "SESSION_SECRET").then(|| "flow".to_string()))
}

async fn insert_code(db: &Db, phone: &str, code: &str) -> anyhow::Result<()> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    otp_codes::ActiveModel {
        id: NotSet,
        phone: Set(phone.to_string()),
        code_hash: Set(hash),
        attempts: Set(0),
        expires_at: Set(Utc::now() + Duration::minutes(2)),
        created_at: Set(Utc::now()),
    }
    .insert(&*db.orm())
    .await?;
    Ok(())
}

async fn otp_locks_after_repeated_failures(db: &Db) -> anyhow::Result<()> {
    let config = flow_config();
    let phone = "09123334455";
    insert_code(db, phone, "654321").await?;
    let attempt = |code: &str| VerifyOtpRequest {
        phone: phone.into(),
        code: code.into(),
    };

    let before = db.stats();
    for _ in 0..auth_service::MAX_OTP_ATTEMPTS {
        let wrong = auth_service::verify_otp(db, &config, attempt("000000")).await;
        assert_eq!(wrong.error().map(|e| e.message.as_str()), Some(msg::INVALID_OTP));
    }
    // The right code no longer helps once the budget is spent.
    let locked = auth_service::verify_otp(db, &config, attempt("654321")).await;
    assert_eq!(locked.error().map(|e| e.message.as_str()), Some(msg::OTP_LOCKED));
    let gone = auth_service::verify_otp(db, &config, attempt("654321")).await;
    assert_eq!(gone.error().map(|e| e.message.as_str()), Some(msg::INVALID_OTP));

    // SeaORM actions show up in the pool counters too.
    let after = db.stats();
    let leased = after.acquired - before.acquired;
    assert!(leased >= 7);
    assert_eq!(after.released - before.released, leased);
    Ok(())
}

async fn otp_resend_is_throttled(db: &Db) -> anyhow::Result<()> {
    let request = || OtpRequest {
        phone: "09125556677".into(),
    };
    let sent = auth_service::request_otp(db, request()).await.into_result().unwrap();
    assert_eq!(sent.expires_in_secs, auth_service::OTP_TTL_SECS);

    let again = auth_service::request_otp(db, request()).await;
    assert_eq!(again.error().map(|e| e.message.as_str()), Some(msg::OTP_TOO_SOON));
    Ok(())
}

async fn otp_sign_in(db: &Db) -> anyhow::Result<()> {
    let config = flow_config();
    let phone = "09120001122";
    insert_code(db, phone, "123456").await?;

    let wrong = auth_service::verify_otp(
        db,
        &config,
        VerifyOtpRequest {
            phone: phone.into(),
            code: "000000".into(),
        },
    )
    .await;
    assert_eq!(wrong.error().map(|e| e.message.as_str()), Some(msg::INVALID_OTP));

    let signed_in = auth_service::verify_otp(
        db,
        &config,
        VerifyOtpRequest {
            phone: "+98 912 000 1122".into(),
            code: "123456".into(),
        },
    )
    .await
    .into_result()
    .unwrap();
    assert_eq!(signed_in.user.phone, phone);
    assert!(!signed_in.user.profile_complete());

    // The code is consumed.
    let replay = auth_service::verify_otp(
        db,
        &config,
        VerifyOtpRequest {
            phone: phone.into(),
            code: "123456".into(),
        },
    )
    .await;
    assert!(!replay.is_success());

    let user = AuthUser {
        user_id: signed_in.user.id,
        role: signed_in.user.role.clone(),
    };
    let profile = ProfileRequest {
        first_name: "سارا".into(),
        last_name: "احمدی".into(),
        email: Some("sara@example.com".into()),
    };
    assert!(auth_service::complete_profile(db, &user, profile).await.is_success());

    let state = auth_service::current_session(db, Some(user))
        .await
        .into_result()
        .unwrap();
    assert!(state.profile_complete);
    assert!(!state.loading);
    assert_eq!(state.user.map(|u| u.phone).as_deref(), Some(phone));
    Ok(())
}

async fn failed_queries_release_connections(db: &Db) -> anyhow::Result<()> {
    {
        let mut conn = db.acquire().await?;
        sqlx::query("RENAME TABLE banners TO banners_hidden").execute(&mut *conn).await?;
    }

    let before = db.stats();
    for _ in 0..5 {
        let err = banner_service::fetch_banners_client(db)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(err.message, msg::BANNERS_FAILED);
    }
    let after = db.stats();
    assert_eq!(after.acquired - before.acquired, 5);
    assert_eq!(after.released - before.released, 5);

    let mut conn = db.acquire().await?;
    sqlx::query("RENAME TABLE banners_hidden TO banners").execute(&mut *conn).await?;
    Ok(())
}

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use kalanow_store::{
    config::DbConfig,
    db::{Db, run_migrations},
    session::normalize_phone,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db = Db::connect_lazy(&DbConfig::from_env());
    // Ensure migrations are applied.
    run_migrations(&db).await?;

    let phone = std::env::var("SEED_ADMIN_PHONE").unwrap_or_else(|_| "09120000000".to_string());
    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_id = ensure_admin(&db, &phone, &password).await?;

    seed_banners(&db).await?;
    seed_categories(&db).await?;
    seed_pages(&db).await?;
    seed_products(&db).await?;

    db.shutdown().await;
    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(db: &Db, phone: &str, password: &str) -> anyhow::Result<i64> {
    let phone = normalize_phone(phone)
        .ok_or_else(|| anyhow::anyhow!("SEED_ADMIN_PHONE is not a mobile number"))?;
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let mut conn = db.acquire().await?;
    sqlx::query(
        r#"
        INSERT INTO users (phone, first_name, last_name, password_hash, role, is_active)
        VALUES (?, 'مدیر', 'سایت', ?, 'admin', TRUE)
        ON DUPLICATE KEY UPDATE password_hash = VALUES(password_hash), role = 'admin'
        "#,
    )
    .bind(&phone)
    .bind(password_hash)
    .execute(&mut *conn)
    .await?;

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE phone = ?")
        .bind(&phone)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

async fn table_is_empty(db: &Db, table: &str) -> anyhow::Result<bool> {
    let mut conn = db.acquire().await?;
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut *conn)
        .await?;
    Ok(count == 0)
}

async fn seed_banners(db: &Db) -> anyhow::Result<()> {
    if !table_is_empty(db, "banners").await? {
        return Ok(());
    }
    let banners = [
        ("حراج پاییزه", "https://picsum.photos/seed/autumn/1200/400", 1, true),
        ("ارسال رایگان", "https://picsum.photos/seed/shipping/1200/400", 2, true),
        ("محصولات جدید", "https://placehold.co/1200x400", 3, false),
    ];

    let mut conn = db.acquire().await?;
    for (title, image_url, order, is_active) in banners {
        sqlx::query("INSERT INTO banners (title, image_url, `order`, is_active) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind(image_url)
            .bind(order)
            .bind(is_active)
            .execute(&mut *conn)
            .await?;
    }
    println!("Seeded banners");
    Ok(())
}

async fn seed_categories(db: &Db) -> anyhow::Result<()> {
    let top_level = [
        ("کالای دیجیتال", "digital", 1),
        ("مد و پوشاک", "fashion", 2),
        ("خانه و آشپزخانه", "home-kitchen", 3),
        ("کتاب و لوازم تحریر", "books", 4),
        ("ورزش و سفر", "sport-travel", 5),
    ];

    let mut conn = db.acquire().await?;
    for (name, slug, order) in top_level {
        sqlx::query("INSERT IGNORE INTO categories (name, slug, `order`) VALUES (?, ?, ?)")
            .bind(name)
            .bind(slug)
            .bind(order)
            .execute(&mut *conn)
            .await?;
    }
    sqlx::query(
        r#"
        INSERT IGNORE INTO categories (name, slug, parent_id, `order`)
        SELECT 'موبایل', 'mobile', id, 1 FROM categories WHERE slug = 'digital'
        "#,
    )
    .execute(&mut *conn)
    .await?;
    println!("Seeded categories");
    Ok(())
}

async fn seed_pages(db: &Db) -> anyhow::Result<()> {
    let pages = [
        ("about", "درباره ما", "<p>فروشگاه اینترنتی کالانو</p>"),
        ("terms", "قوانین و مقررات", "<p>شرایط استفاده از خدمات</p>"),
        ("privacy", "حریم خصوصی", "<p>سیاست حفظ حریم خصوصی</p>"),
    ];

    let mut conn = db.acquire().await?;
    for (slug, title, content) in pages {
        sqlx::query("INSERT IGNORE INTO info_pages (slug, title, content, meta_title) VALUES (?, ?, ?, ?)")
            .bind(slug)
            .bind(title)
            .bind(content)
            .bind(title)
            .execute(&mut *conn)
            .await?;
    }
    println!("Seeded pages");
    Ok(())
}

async fn seed_products(db: &Db) -> anyhow::Result<()> {
    if !table_is_empty(db, "products").await? {
        return Ok(());
    }
    let products = [
        ("گوشی هوشمند", "digital", 12_500_000_i64, Some(14_000_000_i64)),
        ("هدفون بی‌سیم", "digital", 2_300_000, None),
        ("تی‌شرت نخی", "fashion", 450_000, Some(600_000)),
        ("ماگ سرامیکی", "home-kitchen", 180_000, None),
    ];

    let mut conn = db.acquire().await?;
    for (idx, (name, category_slug, price, original_price)) in products.into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO products (name, price, original_price, image_url, category_id)
            SELECT ?, ?, ?, ?, id FROM categories WHERE slug = ?
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(original_price)
        .bind(format!("https://picsum.photos/seed/product{idx}/600/600"))
        .bind(category_slug)
        .execute(&mut *conn)
        .await?;
    }
    println!("Seeded products");
    Ok(())
}

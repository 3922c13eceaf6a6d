use sqlx::FromRow;

use crate::{
    db::Db,
    dto::banners::BannerInput,
    error::{ActionResult, AppError, AppResult, msg},
    images::{ensure_image_url, ensure_optional_image_url},
    models::Banner,
    response::Deleted,
    services::{non_blank, required},
};

#[derive(Debug, FromRow)]
struct BannerRow {
    id: i64,
    title: String,
    description: Option<String>,
    image_url: String,
    mobile_image_url: Option<String>,
    link: Option<String>,
    order: i32,
    is_active: bool,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Banner {
            id: row.id,
            title: row.title,
            description: non_blank(row.description),
            image_url: row.image_url,
            mobile_image_url: non_blank(row.mobile_image_url),
            link: non_blank(row.link),
            order: row.order,
            is_active: row.is_active,
        }
    }
}

/// Active banners for the storefront carousel, in display order.
pub async fn fetch_banners_client(db: &Db) -> ActionResult<Vec<Banner>> {
    ActionResult::settle(load_banners(db, true).await, "fetch_banners_client", msg::BANNERS_FAILED)
}

pub async fn list_banners_admin(db: &Db) -> ActionResult<Vec<Banner>> {
    ActionResult::settle(load_banners(db, false).await, "list_banners_admin", msg::BANNERS_FAILED)
}

pub async fn create_banner(db: &Db, payload: BannerInput) -> ActionResult<Banner> {
    ActionResult::settle(insert_banner(db, payload).await, "create_banner", msg::SAVE_FAILED)
}

pub async fn update_banner(db: &Db, id: i64, payload: BannerInput) -> ActionResult<Banner> {
    ActionResult::settle(
        replace_banner(db, id, payload).await,
        "update_banner",
        msg::SAVE_FAILED,
    )
}

pub async fn delete_banner(db: &Db, id: i64) -> ActionResult<Deleted> {
    ActionResult::settle(remove_banner(db, id).await, "delete_banner", msg::DELETE_FAILED)
}

async fn load_banners(db: &Db, active_only: bool) -> AppResult<Vec<Banner>> {
    let sql = if active_only {
        "SELECT id, title, description, image_url, mobile_image_url, link, `order`, is_active \
         FROM banners WHERE is_active = TRUE ORDER BY `order` ASC, id ASC"
    } else {
        "SELECT id, title, description, image_url, mobile_image_url, link, `order`, is_active \
         FROM banners ORDER BY `order` ASC, id ASC"
    };

    let mut conn = db.acquire().await?;
    let rows = sqlx::query_as::<_, BannerRow>(sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Banner::from).collect())
}

struct ValidBanner {
    title: String,
    description: Option<String>,
    image_url: String,
    mobile_image_url: Option<String>,
    link: Option<String>,
    order: i32,
    is_active: bool,
}

fn validate(payload: BannerInput) -> AppResult<ValidBanner> {
    let title = required(&payload.title)?;
    let image_url = required(&payload.image_url)?;
    ensure_image_url(&image_url)?;
    ensure_optional_image_url(payload.mobile_image_url.as_deref())?;

    Ok(ValidBanner {
        title,
        description: non_blank(payload.description),
        image_url,
        mobile_image_url: non_blank(payload.mobile_image_url),
        link: non_blank(payload.link),
        order: payload.order,
        is_active: payload.is_active,
    })
}

async fn insert_banner(db: &Db, payload: BannerInput) -> AppResult<Banner> {
    let banner = validate(payload)?;
    let mut conn = db.acquire().await?;
    let done = sqlx::query(
        r#"
        INSERT INTO banners (title, description, image_url, mobile_image_url, link, `order`, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(banner.title)
    .bind(banner.description)
    .bind(banner.image_url)
    .bind(banner.mobile_image_url)
    .bind(banner.link)
    .bind(banner.order)
    .bind(banner.is_active)
    .execute(&mut *conn)
    .await?;

    find_banner(&mut conn, done.last_insert_id() as i64)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))
}

async fn replace_banner(db: &Db, id: i64, payload: BannerInput) -> AppResult<Banner> {
    let banner = validate(payload)?;
    let mut conn = db.acquire().await?;
    sqlx::query(
        r#"
        UPDATE banners
        SET title = ?, description = ?, image_url = ?, mobile_image_url = ?, link = ?,
            `order` = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(banner.title)
    .bind(banner.description)
    .bind(banner.image_url)
    .bind(banner.mobile_image_url)
    .bind(banner.link)
    .bind(banner.order)
    .bind(banner.is_active)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    // MySQL reports zero affected rows for an unchanged row, so existence
    // is decided by the re-read.
    find_banner(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))
}

async fn remove_banner(db: &Db, id: i64) -> AppResult<Deleted> {
    let mut conn = db.acquire().await?;
    let done = sqlx::query("DELETE FROM banners WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(msg::RECORD_NOT_FOUND));
    }
    Ok(Deleted { id })
}

async fn find_banner(conn: &mut sqlx::MySqlConnection, id: i64) -> AppResult<Option<Banner>> {
    let row = sqlx::query_as::<_, BannerRow>(
        "SELECT id, title, description, image_url, mobile_image_url, link, `order`, is_active \
         FROM banners WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Banner::from))
}

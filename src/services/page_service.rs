use sqlx::{FromRow, MySqlConnection};

use crate::{
    db::Db,
    dto::pages::InfoPageInput,
    error::{ActionResult, AppError, AppResult, msg},
    models::InfoPage,
    response::Deleted,
    services::{non_blank, required, slug_or_reject, unique_violation},
};

#[derive(Debug, FromRow)]
struct InfoPageRow {
    id: i64,
    slug: String,
    title: String,
    content: String,
    meta_title: Option<String>,
    meta_description: Option<String>,
    is_active: bool,
}

impl From<InfoPageRow> for InfoPage {
    fn from(row: InfoPageRow) -> Self {
        InfoPage {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            meta_title: non_blank(row.meta_title),
            meta_description: non_blank(row.meta_description),
            is_active: row.is_active,
        }
    }
}

/// Public page lookup. Missing and inactive pages both yield the
/// not-found message, which the page route turns into a 404.
pub async fn fetch_info_page_by_slug(db: &Db, slug: &str) -> ActionResult<InfoPage> {
    ActionResult::settle(
        find_active(db, slug).await,
        "fetch_info_page_by_slug",
        msg::PAGE_FAILED,
    )
}

pub async fn list_pages_admin(db: &Db) -> ActionResult<Vec<InfoPage>> {
    let result = async {
        let mut conn = db.acquire().await?;
        let rows = sqlx::query_as::<_, InfoPageRow>(
            "SELECT id, slug, title, content, meta_title, meta_description, is_active \
             FROM info_pages ORDER BY title ASC, id ASC",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok::<_, AppError>(rows.into_iter().map(InfoPage::from).collect())
    }
    .await;
    ActionResult::settle(result, "list_pages_admin", msg::LOAD_FAILED)
}

pub async fn create_page(db: &Db, payload: InfoPageInput) -> ActionResult<InfoPage> {
    ActionResult::settle(insert_page(db, payload).await, "create_page", msg::SAVE_FAILED)
}

pub async fn update_page(db: &Db, id: i64, payload: InfoPageInput) -> ActionResult<InfoPage> {
    ActionResult::settle(replace_page(db, id, payload).await, "update_page", msg::SAVE_FAILED)
}

pub async fn delete_page(db: &Db, id: i64) -> ActionResult<Deleted> {
    ActionResult::settle(remove_page(db, id).await, "delete_page", msg::DELETE_FAILED)
}

async fn find_active(db: &Db, slug: &str) -> AppResult<InfoPage> {
    let mut conn = db.acquire().await?;
    let row = sqlx::query_as::<_, InfoPageRow>(
        "SELECT id, slug, title, content, meta_title, meta_description, is_active \
         FROM info_pages WHERE slug = ? AND is_active = TRUE LIMIT 1",
    )
    .bind(slug.trim())
    .fetch_optional(&mut *conn)
    .await?;
    row.map(InfoPage::from)
        .ok_or(AppError::NotFound(msg::PAGE_NOT_FOUND))
}

struct ValidPage {
    slug: String,
    title: String,
    content: String,
    meta_title: Option<String>,
    meta_description: Option<String>,
    is_active: bool,
}

fn validate(payload: InfoPageInput) -> AppResult<ValidPage> {
    Ok(ValidPage {
        slug: slug_or_reject(&payload.slug)?,
        title: required(&payload.title)?,
        content: required(&payload.content)?,
        meta_title: non_blank(payload.meta_title),
        meta_description: non_blank(payload.meta_description),
        is_active: payload.is_active,
    })
}

async fn insert_page(db: &Db, payload: InfoPageInput) -> AppResult<InfoPage> {
    let page = validate(payload)?;
    let mut conn = db.acquire().await?;
    let done = sqlx::query(
        r#"
        INSERT INTO info_pages (slug, title, content, meta_title, meta_description, is_active)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(page.slug)
    .bind(page.title)
    .bind(page.content)
    .bind(page.meta_title)
    .bind(page.meta_description)
    .bind(page.is_active)
    .execute(&mut *conn)
    .await
    .map_err(|err| unique_violation(err, msg::SLUG_TAKEN))?;

    find_by_id(&mut conn, done.last_insert_id() as i64)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))
}

async fn replace_page(db: &Db, id: i64, payload: InfoPageInput) -> AppResult<InfoPage> {
    let page = validate(payload)?;
    let mut conn = db.acquire().await?;
    sqlx::query(
        r#"
        UPDATE info_pages
        SET slug = ?, title = ?, content = ?, meta_title = ?, meta_description = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(page.slug)
    .bind(page.title)
    .bind(page.content)
    .bind(page.meta_title)
    .bind(page.meta_description)
    .bind(page.is_active)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|err| unique_violation(err, msg::SLUG_TAKEN))?;

    find_by_id(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))
}

async fn remove_page(db: &Db, id: i64) -> AppResult<Deleted> {
    let mut conn = db.acquire().await?;
    let done = sqlx::query("DELETE FROM info_pages WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(msg::RECORD_NOT_FOUND));
    }
    Ok(Deleted { id })
}

async fn find_by_id(conn: &mut MySqlConnection, id: i64) -> AppResult<Option<InfoPage>> {
    let row = sqlx::query_as::<_, InfoPageRow>(
        "SELECT id, slug, title, content, meta_title, meta_description, is_active \
         FROM info_pages WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(InfoPage::from))
}

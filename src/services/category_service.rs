use std::collections::{HashMap, HashSet};

use sqlx::{FromRow, MySqlConnection};

use crate::{
    db::Db,
    dto::categories::CategoryInput,
    error::{ActionResult, AppError, AppResult, msg},
    images::ensure_optional_image_url,
    models::{Category, CategoryNode},
    response::Deleted,
    routes::params::CategoryFilter,
    services::{non_blank, required, slug_or_reject, unique_violation},
};

/// Slugs taken by fixed routes under `/api/categories`.
pub const RESERVED_SLUGS: [&str; 1] = ["tree"];

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    parent_id: Option<i64>,
    order: i32,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id.to_string(),
            name: row.name,
            slug: row.slug,
            description: non_blank(row.description),
            image_url: non_blank(row.image_url),
            parent_id: row.parent_id.map(|id| id.to_string()),
            order: row.order,
            is_active: row.is_active,
        }
    }
}

pub async fn fetch_active_categories_client(
    db: &Db,
    filter: &CategoryFilter,
) -> ActionResult<Vec<Category>> {
    ActionResult::settle(
        load_filtered(db, filter).await,
        "fetch_active_categories_client",
        msg::CATEGORIES_FAILED,
    )
}

pub async fn fetch_category_by_slug(db: &Db, slug: &str) -> ActionResult<Category> {
    ActionResult::settle(
        find_by_slug(db, slug).await,
        "fetch_category_by_slug",
        msg::CATEGORIES_FAILED,
    )
}

/// Every active category, nested under its parent.
pub async fn fetch_category_tree(db: &Db) -> ActionResult<Vec<CategoryNode>> {
    let result = load_all(db, true).await.map(build_category_tree);
    ActionResult::settle(result, "fetch_category_tree", msg::CATEGORIES_FAILED)
}

pub async fn list_categories_admin(db: &Db) -> ActionResult<Vec<Category>> {
    ActionResult::settle(load_all(db, false).await, "list_categories_admin", msg::CATEGORIES_FAILED)
}

pub async fn create_category(db: &Db, payload: CategoryInput) -> ActionResult<Category> {
    ActionResult::settle(insert_category(db, payload).await, "create_category", msg::SAVE_FAILED)
}

pub async fn update_category(db: &Db, id: i64, payload: CategoryInput) -> ActionResult<Category> {
    ActionResult::settle(
        replace_category(db, id, payload).await,
        "update_category",
        msg::SAVE_FAILED,
    )
}

/// Children of a deleted category move to the top level (FK `ON DELETE SET NULL`).
pub async fn delete_category(db: &Db, id: i64) -> ActionResult<Deleted> {
    ActionResult::settle(remove_category(db, id).await, "delete_category", msg::DELETE_FAILED)
}

async fn load_filtered(db: &Db, filter: &CategoryFilter) -> AppResult<Vec<Category>> {
    let sql = filter.to_sql();
    let mut query = sqlx::query_as::<_, CategoryRow>(&sql);
    if let Some(parent_id) = filter.parent_id {
        query = query.bind(parent_id);
    }
    query = query.bind(filter.limit);

    let mut conn = db.acquire().await?;
    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

async fn find_by_slug(db: &Db, slug: &str) -> AppResult<Category> {
    let mut conn = db.acquire().await?;
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, description, image_url, parent_id, `order`, is_active \
         FROM categories WHERE slug = ? AND is_active = TRUE LIMIT 1",
    )
    .bind(slug.trim())
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Category::from)
        .ok_or(AppError::NotFound(msg::CATEGORY_NOT_FOUND))
}

async fn load_all(db: &Db, active_only: bool) -> AppResult<Vec<Category>> {
    let sql = if active_only {
        "SELECT id, name, slug, description, image_url, parent_id, `order`, is_active \
         FROM categories WHERE is_active = TRUE ORDER BY `order` ASC, id ASC"
    } else {
        "SELECT id, name, slug, description, image_url, parent_id, `order`, is_active \
         FROM categories ORDER BY `order` ASC, id ASC"
    };
    let mut conn = db.acquire().await?;
    let rows = sqlx::query_as::<_, CategoryRow>(sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

/// Nest categories under their parents. Siblings are ordered by `order`
/// then id; a category whose parent is absent from `categories` is dropped.
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<String>, Vec<Category>> = HashMap::new();
    for category in categories {
        by_parent
            .entry(category.parent_id.clone())
            .or_default()
            .push(category);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|c| (c.order, c.id.parse::<i64>().unwrap_or(i64::MAX)));
    }
    attach_children(None, &mut by_parent)
}

fn attach_children(
    parent: Option<String>,
    by_parent: &mut HashMap<Option<String>, Vec<Category>>,
) -> Vec<CategoryNode> {
    let Some(siblings) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    siblings
        .into_iter()
        .map(|category| {
            let children = attach_children(Some(category.id.clone()), by_parent);
            CategoryNode { category, children }
        })
        .collect()
}

/// True when making `new_parent` the parent of `id` would put `id` among its
/// own ancestors. `parents` maps every category id to its current parent.
pub fn would_create_cycle(
    parents: &HashMap<i64, Option<i64>>,
    id: i64,
    new_parent: Option<i64>,
) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = new_parent;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        if !seen.insert(current) {
            // Pre-existing loop that does not involve `id`.
            return false;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

struct ValidCategory {
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    parent_id: Option<i64>,
    order: i32,
    is_active: bool,
}

fn validate(payload: CategoryInput) -> AppResult<ValidCategory> {
    let name = required(&payload.name)?;
    let slug = slug_or_reject(&payload.slug)?;
    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Err(AppError::bad_request(msg::SLUG_RESERVED));
    }
    ensure_optional_image_url(payload.image_url.as_deref())?;
    Ok(ValidCategory {
        name,
        slug,
        description: non_blank(payload.description),
        image_url: non_blank(payload.image_url),
        parent_id: payload.parent_id,
        order: payload.order,
        is_active: payload.is_active,
    })
}

async fn parent_map(conn: &mut MySqlConnection) -> AppResult<HashMap<i64, Option<i64>>> {
    let rows: Vec<(i64, Option<i64>)> = sqlx::query_as("SELECT id, parent_id FROM categories")
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn insert_category(db: &Db, payload: CategoryInput) -> AppResult<Category> {
    let category = validate(payload)?;
    let mut conn = db.acquire().await?;

    if let Some(parent_id) = category.parent_id {
        let parents = parent_map(&mut conn).await?;
        if !parents.contains_key(&parent_id) {
            return Err(AppError::bad_request(msg::INVALID_PARENT));
        }
    }

    let done = sqlx::query(
        r#"
        INSERT INTO categories (name, slug, description, image_url, parent_id, `order`, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(category.name)
    .bind(category.slug)
    .bind(category.description)
    .bind(category.image_url)
    .bind(category.parent_id)
    .bind(category.order)
    .bind(category.is_active)
    .execute(&mut *conn)
    .await
    .map_err(|err| unique_violation(err, msg::SLUG_TAKEN))?;

    find_category(&mut conn, done.last_insert_id() as i64)
        .await?
        .ok_or(AppError::NotFound(msg::CATEGORY_NOT_FOUND))
}

async fn replace_category(db: &Db, id: i64, payload: CategoryInput) -> AppResult<Category> {
    let category = validate(payload)?;
    let mut conn = db.acquire().await?;

    let parents = parent_map(&mut conn).await?;
    if !parents.contains_key(&id) {
        return Err(AppError::NotFound(msg::CATEGORY_NOT_FOUND));
    }
    if let Some(parent_id) = category.parent_id {
        if !parents.contains_key(&parent_id) {
            return Err(AppError::bad_request(msg::INVALID_PARENT));
        }
    }
    if would_create_cycle(&parents, id, category.parent_id) {
        return Err(AppError::bad_request(msg::CATEGORY_CYCLE));
    }

    sqlx::query(
        r#"
        UPDATE categories
        SET name = ?, slug = ?, description = ?, image_url = ?, parent_id = ?,
            `order` = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(category.name)
    .bind(category.slug)
    .bind(category.description)
    .bind(category.image_url)
    .bind(category.parent_id)
    .bind(category.order)
    .bind(category.is_active)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|err| unique_violation(err, msg::SLUG_TAKEN))?;

    find_category(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound(msg::CATEGORY_NOT_FOUND))
}

async fn remove_category(db: &Db, id: i64) -> AppResult<Deleted> {
    let mut conn = db.acquire().await?;
    let done = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(msg::CATEGORY_NOT_FOUND));
    }
    Ok(Deleted { id })
}

async fn find_category(conn: &mut MySqlConnection, id: i64) -> AppResult<Option<Category>> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, description, image_url, parent_id, `order`, is_active \
         FROM categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Category::from))
}

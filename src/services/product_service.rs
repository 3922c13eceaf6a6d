use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};

use crate::{
    db::Db,
    dto::products::ProductInput,
    error::{ActionResult, AppError, AppResult, msg},
    images::ensure_optional_image_url,
    models::Product,
    response::{Deleted, Meta, Page},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{non_blank, required},
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, discount_percent, \
                               image_url, category_id, is_active, created_at";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
    original_price: Option<i64>,
    discount_percent: Option<i32>,
    image_url: Option<String>,
    category_id: Option<i64>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let discount_percent = row
            .discount_percent
            .or_else(|| Product::derive_discount_percent(row.price, row.original_price));
        Product {
            id: row.id,
            name: row.name,
            description: non_blank(row.description),
            price: row.price,
            original_price: row.original_price,
            discount_percent,
            image_url: non_blank(row.image_url),
            category_id: row.category_id.map(|id| id.to_string()),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Normalised product listing options.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub active_only: bool,
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub sort_by: ProductSortBy,
    pub sort_order: SortOrder,
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
}

impl ProductListing {
    pub fn from_query(query: &ProductQuery, active_only: bool) -> Self {
        let (page, per_page, offset) = query.pagination().normalize();
        Self {
            active_only,
            search: non_blank(query.q.clone()),
            category_id: query.category_id,
            sort_by: ProductSortBy::parse_or_default(query.sort_by.as_deref()),
            sort_order: SortOrder::parse_or(query.sort_order.as_deref(), SortOrder::Desc),
            page,
            per_page,
            offset,
        }
    }

    fn push_filters(&self, builder: &mut QueryBuilder<'_, MySql>) {
        if self.active_only {
            builder.push(" AND is_active = TRUE");
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            builder
                .push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category_id) = self.category_id {
            builder.push(" AND category_id = ").push_bind(category_id);
        }
    }

    pub fn select_query(&self) -> QueryBuilder<'static, MySql> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"
        ));
        self.push_filters(&mut builder);
        builder.push(format!(
            " ORDER BY {column} {dir}, id {dir} LIMIT ",
            column = self.sort_by.as_sql(),
            dir = self.sort_order.as_sql(),
        ));
        builder.push_bind(self.per_page);
        builder.push(" OFFSET ");
        builder.push_bind(self.offset);
        builder
    }

    pub fn count_query(&self) -> QueryBuilder<'static, MySql> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1 = 1");
        self.push_filters(&mut builder);
        builder
    }
}

/// `%`, `_` and `\` are literal inside a search term.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub async fn list_products(db: &Db, query: ProductQuery) -> ActionResult<Page<Product>> {
    let listing = ProductListing::from_query(&query, true);
    ActionResult::settle(load_page(db, &listing).await, "list_products", msg::PRODUCTS_FAILED)
}

pub async fn list_products_admin(db: &Db, query: ProductQuery) -> ActionResult<Page<Product>> {
    let listing = ProductListing::from_query(&query, false);
    ActionResult::settle(
        load_page(db, &listing).await,
        "list_products_admin",
        msg::PRODUCTS_FAILED,
    )
}

pub async fn get_product(db: &Db, id: i64) -> ActionResult<Product> {
    ActionResult::settle(find_active(db, id).await, "get_product", msg::PRODUCTS_FAILED)
}

pub async fn create_product(db: &Db, payload: ProductInput) -> ActionResult<Product> {
    ActionResult::settle(insert_product(db, payload).await, "create_product", msg::SAVE_FAILED)
}

pub async fn update_product(db: &Db, id: i64, payload: ProductInput) -> ActionResult<Product> {
    ActionResult::settle(
        replace_product(db, id, payload).await,
        "update_product",
        msg::SAVE_FAILED,
    )
}

pub async fn delete_product(db: &Db, id: i64) -> ActionResult<Deleted> {
    ActionResult::settle(remove_product(db, id).await, "delete_product", msg::DELETE_FAILED)
}

async fn load_page(db: &Db, listing: &ProductListing) -> AppResult<Page<Product>> {
    let mut conn = db.acquire().await?;

    let total: i64 = listing
        .count_query()
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let items = listing
        .select_query()
        .build_query_as::<ProductRow>()
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(Page {
        items,
        meta: Meta::new(listing.page, listing.per_page, total),
    })
}

async fn find_active(db: &Db, id: i64) -> AppResult<Product> {
    let mut conn = db.acquire().await?;
    find_by_id(&mut conn, id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(AppError::NotFound(msg::PRODUCT_NOT_FOUND))
}

struct ValidProduct {
    name: String,
    description: Option<String>,
    price: i64,
    original_price: Option<i64>,
    discount_percent: Option<i32>,
    image_url: Option<String>,
    category_id: Option<i64>,
    is_active: bool,
}

fn validate(payload: ProductInput) -> AppResult<ValidProduct> {
    let name = required(&payload.name)?;
    if payload.price <= 0 {
        return Err(AppError::bad_request(msg::INVALID_PRICE));
    }
    if payload.original_price.is_some_and(|original| original < payload.price) {
        return Err(AppError::bad_request(msg::INVALID_PRICE));
    }
    if payload
        .discount_percent
        .is_some_and(|percent| !(0..=100).contains(&percent))
    {
        return Err(AppError::bad_request(msg::INVALID_DISCOUNT));
    }
    ensure_optional_image_url(payload.image_url.as_deref())?;

    Ok(ValidProduct {
        name,
        description: non_blank(payload.description),
        price: payload.price,
        original_price: payload.original_price,
        discount_percent: payload.discount_percent,
        image_url: non_blank(payload.image_url),
        category_id: payload.category_id,
        is_active: payload.is_active,
    })
}

async fn insert_product(db: &Db, payload: ProductInput) -> AppResult<Product> {
    let product = validate(payload)?;
    let mut conn = db.acquire().await?;
    let done = sqlx::query(
        r#"
        INSERT INTO products
            (name, description, price, original_price, discount_percent, image_url, category_id, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.original_price)
    .bind(product.discount_percent)
    .bind(product.image_url)
    .bind(product.category_id)
    .bind(product.is_active)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut conn, done.last_insert_id() as i64)
        .await?
        .ok_or(AppError::NotFound(msg::PRODUCT_NOT_FOUND))
}

async fn replace_product(db: &Db, id: i64, payload: ProductInput) -> AppResult<Product> {
    let product = validate(payload)?;
    let mut conn = db.acquire().await?;
    sqlx::query(
        r#"
        UPDATE products
        SET name = ?, description = ?, price = ?, original_price = ?, discount_percent = ?,
            image_url = ?, category_id = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.original_price)
    .bind(product.discount_percent)
    .bind(product.image_url)
    .bind(product.category_id)
    .bind(product.is_active)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound(msg::PRODUCT_NOT_FOUND))
}

async fn remove_product(db: &Db, id: i64) -> AppResult<Deleted> {
    let mut conn = db.acquire().await?;
    let done = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if done.rows_affected() == 0 {
        return Err(AppError::NotFound(msg::PRODUCT_NOT_FOUND));
    }
    Ok(Deleted { id })
}

async fn find_by_id(conn: &mut MySqlConnection, id: i64) -> AppResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Product::from))
}

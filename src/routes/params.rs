use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    /// `(page, per_page, offset)`. Pages past the end saturate the offset
    /// and come back empty.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `asc`/`desc` (any case) yields `default`.
    pub fn parse_or(raw: Option<&str>, default: SortOrder) -> SortOrder {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("ASC") => SortOrder::Asc,
            Some("DESC") => SortOrder::Desc,
            _ => default,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Columns a category listing may be ordered by. These are the only strings
/// ever interpolated into the ORDER BY clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySortBy {
    Name,
    #[default]
    Order,
}

impl CategorySortBy {
    pub fn parse_or_default(raw: Option<&str>) -> CategorySortBy {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("name") => CategorySortBy::Name,
            Some("order") => CategorySortBy::Order,
            _ => CategorySortBy::default(),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            CategorySortBy::Name => "name",
            CategorySortBy::Order => "`order`",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSortBy {
    #[default]
    CreatedAt,
    Price,
    Name,
}

impl ProductSortBy {
    pub fn parse_or_default(raw: Option<&str>) -> ProductSortBy {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("created_at") | Some("createdat") => ProductSortBy::CreatedAt,
            Some("price") => ProductSortBy::Price,
            Some("name") => ProductSortBy::Name,
            _ => ProductSortBy::default(),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            ProductSortBy::CreatedAt => "created_at",
            ProductSortBy::Price => "price",
            ProductSortBy::Name => "name",
        }
    }
}

/// Raw category listing options as they arrive on the query string. Every
/// field is free text so bad input degrades to defaults instead of a 400.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    /// Default 6, clamped to 1..=50.
    pub limit: Option<String>,
    /// Empty, `null` or absent selects top-level categories.
    pub parent_id: Option<String>,
    /// `name` or `order` (default).
    pub sort_by: Option<String>,
    /// `ASC` (default) or `DESC`.
    pub sort_order: Option<String>,
}

/// Validated category listing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    pub limit: u32,
    /// `None` selects top-level categories (`parent_id IS NULL`).
    pub parent_id: Option<i64>,
    pub sort_by: CategorySortBy,
    pub sort_order: SortOrder,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            parent_id: None,
            sort_by: CategorySortBy::Order,
            sort_order: SortOrder::Asc,
        }
    }
}

impl CategoryFilter {
    pub const DEFAULT_LIMIT: u32 = 6;
    pub const MAX_LIMIT: u32 = 50;

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit.clamp(1, Self::MAX_LIMIT as i64) as u32;
        self
    }

    pub fn with_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn from_query(query: &CategoryQuery) -> Self {
        let limit = query
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        let parent_id = query
            .parent_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        let filter = Self {
            sort_by: CategorySortBy::parse_or_default(query.sort_by.as_deref()),
            sort_order: SortOrder::parse_or(query.sort_order.as_deref(), SortOrder::Asc),
            ..Self::default()
        }
        .with_parent(parent_id);

        match limit {
            Some(limit) => filter.with_limit(limit),
            None => filter,
        }
    }

    /// SELECT for this filter. Placeholders, in order: parent id (when set), limit.
    pub fn to_sql(&self) -> String {
        let parent_clause = match self.parent_id {
            Some(_) => "parent_id = ?",
            None => "parent_id IS NULL",
        };
        format!(
            "SELECT id, name, slug, description, image_url, parent_id, `order`, is_active \
             FROM categories \
             WHERE is_active = TRUE AND {parent_clause} \
             ORDER BY {} {}, id ASC \
             LIMIT ?",
            self.sort_by.as_sql(),
            self.sort_order.as_sql(),
        )
    }
}

// Query strings are decoded by serde_urlencoded, which cannot combine
// `flatten` with numeric fields; pagination is therefore repeated inline.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<i64>,
    /// `created_at` (default), `price` or `name`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Free-text filter; meaning depends on the listing (phone, status).
    pub q: Option<String>,
}

impl AdminListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

use kalanow_store::{
    routes::params::{
        AdminListQuery, CategoryFilter, CategoryQuery, CategorySortBy, Pagination, ProductQuery,
        SortOrder,
    },
    services::product_service::{ProductListing, escape_like},
};

fn query(limit: Option<&str>, parent: Option<&str>, sort_by: Option<&str>, order: Option<&str>) -> CategoryQuery {
    CategoryQuery {
        limit: limit.map(str::to_string),
        parent_id: parent.map(str::to_string),
        sort_by: sort_by.map(str::to_string),
        sort_order: order.map(str::to_string),
    }
}

#[test]
fn category_filter_defaults() {
    let filter = CategoryFilter::from_query(&CategoryQuery::default());
    assert_eq!(filter, CategoryFilter::default());
    assert_eq!(filter.limit, 6);
    assert_eq!(filter.parent_id, None);
    assert_eq!(filter.sort_by, CategorySortBy::Order);
    assert_eq!(filter.sort_order, SortOrder::Asc);
}

#[test]
fn unknown_sort_falls_back_to_order_asc() {
    let hostile = [
        ("price; DROP TABLE categories", "sideways"),
        ("id", "descending"),
        ("", ""),
        ("`order`", "ASC; --"),
    ];
    for (sort_by, sort_order) in hostile {
        let filter = CategoryFilter::from_query(&query(None, None, Some(sort_by), Some(sort_order)));
        assert_eq!(filter.sort_by, CategorySortBy::Order, "sort_by {sort_by:?}");
        assert_eq!(filter.sort_order, SortOrder::Asc, "sort_order {sort_order:?}");
        let sql = filter.to_sql();
        assert!(sql.contains("ORDER BY `order` ASC, id ASC"), "{sql}");
        assert!(!sql.contains("DROP"));
    }
}

#[test]
fn allowed_sort_is_case_insensitive() {
    let filter = CategoryFilter::from_query(&query(None, None, Some("NAME"), Some("desc")));
    assert_eq!(filter.sort_by, CategorySortBy::Name);
    assert_eq!(filter.sort_order, SortOrder::Desc);
    assert!(filter.to_sql().contains("ORDER BY name DESC, id ASC"));
}

#[test]
fn limit_is_clamped_and_garbage_ignored() {
    assert_eq!(CategoryFilter::from_query(&query(Some("2"), None, None, None)).limit, 2);
    assert_eq!(CategoryFilter::from_query(&query(Some("0"), None, None, None)).limit, 1);
    assert_eq!(CategoryFilter::from_query(&query(Some("-5"), None, None, None)).limit, 1);
    assert_eq!(CategoryFilter::from_query(&query(Some("1000"), None, None, None)).limit, 50);
    assert_eq!(CategoryFilter::from_query(&query(Some("six"), None, None, None)).limit, 6);
}

#[test]
fn parent_selects_children_or_top_level() {
    let children = CategoryFilter::from_query(&query(None, Some("12"), None, None));
    assert_eq!(children.parent_id, Some(12));
    assert!(children.to_sql().contains("parent_id = ?"));

    for raw in ["", "null", "abc"] {
        let top = CategoryFilter::from_query(&query(None, Some(raw), None, None));
        assert_eq!(top.parent_id, None, "parentId {raw:?}");
        assert!(top.to_sql().contains("parent_id IS NULL"));
    }
}

#[test]
fn category_sql_only_reads_active_rows() {
    let sql = CategoryFilter::default().with_parent(Some(3)).with_limit(2).to_sql();
    assert!(sql.contains("WHERE is_active = TRUE AND parent_id = ?"));
    assert!(sql.ends_with("LIMIT ?"));
}

#[test]
fn pagination_normalizes_bounds() {
    assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    let p = Pagination { page: Some(3), per_page: Some(10) };
    assert_eq!(p.normalize(), (3, 10, 20));
    let p = Pagination { page: Some(-1), per_page: Some(500) };
    assert_eq!(p.normalize(), (1, 100, 0));
}

#[test]
fn huge_page_saturates_the_offset() {
    let p = Pagination { page: Some(i64::MAX), per_page: Some(100) };
    assert_eq!(p.normalize(), (i64::MAX, 100, i64::MAX));

    let query = ProductQuery { page: Some(i64::MAX), ..Default::default() };
    let listing = ProductListing::from_query(&query, true);
    assert_eq!(listing.page, i64::MAX);
    assert_eq!(listing.offset, i64::MAX);
    assert!(listing.offset >= 0);
}

#[test]
fn admin_search_ignores_blank() {
    let q = AdminListQuery { q: Some("   ".into()), ..Default::default() };
    assert_eq!(q.search(), None);
    let q = AdminListQuery { q: Some(" 0912 ".into()), ..Default::default() };
    assert_eq!(q.search(), Some("0912"));
}

#[test]
fn product_listing_defaults_to_newest_first() {
    let listing = ProductListing::from_query(&ProductQuery::default(), true);
    assert!(listing.active_only);
    assert_eq!(listing.sort_order, SortOrder::Desc);
    let sql = listing.select_query().into_sql();
    assert!(sql.contains("AND is_active = TRUE"), "{sql}");
    assert!(sql.contains("ORDER BY created_at DESC, id DESC LIMIT ?"), "{sql}");
}

#[test]
fn product_listing_binds_search_and_category() {
    let query = ProductQuery {
        q: Some("mug".into()),
        category_id: Some(4),
        sort_by: Some("price".into()),
        sort_order: Some("asc".into()),
        ..Default::default()
    };
    let listing = ProductListing::from_query(&query, false);
    let sql = listing.select_query().into_sql();
    assert!(!sql.contains("is_active = TRUE"));
    assert!(sql.contains("(name LIKE ? OR description LIKE ?)"));
    assert!(sql.contains("AND category_id = ?"));
    assert!(sql.contains("ORDER BY price ASC"));
    assert!(!sql.contains("mug"));

    let count = listing.count_query().into_sql();
    assert!(count.starts_with("SELECT COUNT(*) FROM products"));
    assert!(!count.contains("LIMIT"));
}

#[test]
fn like_wildcards_are_escaped() {
    assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    assert_eq!(escape_like("a\\b"), "a\\\\b");
    assert_eq!(escape_like("plain"), "plain");
}

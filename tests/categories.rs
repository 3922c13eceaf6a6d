use std::{collections::HashMap, time::Duration};

use kalanow_store::{
    config::DbConfig,
    db::Db,
    dto::categories::CategoryInput,
    error::{ErrorKind, msg},
    models::Category,
    services::category_service::{self, build_category_tree, would_create_cycle},
};

fn category(id: i64, parent: Option<i64>, order: i32) -> Category {
    Category {
        id: id.to_string(),
        name: format!("category {id}"),
        slug: format!("category-{id}"),
        description: None,
        image_url: None,
        parent_id: parent.map(|p| p.to_string()),
        order,
        is_active: true,
    }
}

#[test]
fn tree_nests_children_in_display_order() {
    let tree = build_category_tree(vec![
        category(1, None, 2),
        category(2, None, 1),
        category(3, Some(1), 5),
        category(4, Some(1), 0),
        category(5, Some(4), 0),
    ]);

    let roots: Vec<&str> = tree.iter().map(|n| n.category.id.as_str()).collect();
    assert_eq!(roots, ["2", "1"]);

    let children: Vec<&str> = tree[1].children.iter().map(|n| n.category.id.as_str()).collect();
    assert_eq!(children, ["4", "3"]);
    assert_eq!(tree[1].children[0].children[0].category.id, "5");
    assert!(tree[0].children.is_empty());
}

#[test]
fn equal_order_breaks_ties_by_id() {
    let tree = build_category_tree(vec![category(9, None, 0), category(3, None, 0)]);
    let roots: Vec<&str> = tree.iter().map(|n| n.category.id.as_str()).collect();
    assert_eq!(roots, ["3", "9"]);
}

#[test]
fn orphans_are_dropped() {
    let tree = build_category_tree(vec![category(1, None, 0), category(2, Some(42), 0)]);
    assert_eq!(tree.len(), 1);
    assert!(tree[0].children.is_empty());
}

#[test]
fn tree_serializes_flat_fields_with_children() {
    let tree = build_category_tree(vec![category(1, None, 0), category(2, Some(1), 0)]);
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[0]["id"], "1");
    assert_eq!(json[0]["children"][0]["parent_id"], "1");
}

fn parents(pairs: &[(i64, Option<i64>)]) -> HashMap<i64, Option<i64>> {
    pairs.iter().copied().collect()
}

#[test]
fn reparenting_under_a_descendant_is_a_cycle() {
    // 1 <- 2 <- 3
    let map = parents(&[(1, None), (2, Some(1)), (3, Some(2))]);
    assert!(would_create_cycle(&map, 1, Some(3)));
    assert!(would_create_cycle(&map, 1, Some(1)));
    assert!(would_create_cycle(&map, 2, Some(3)));
}

#[test]
fn ordinary_moves_are_allowed() {
    let map = parents(&[(1, None), (2, Some(1)), (3, Some(2)), (4, None)]);
    assert!(!would_create_cycle(&map, 3, Some(4)));
    assert!(!would_create_cycle(&map, 3, None));
    assert!(!would_create_cycle(&map, 4, Some(3)));
}

#[test]
fn existing_loop_elsewhere_terminates() {
    let map = parents(&[(1, Some(2)), (2, Some(1)), (5, None)]);
    assert!(!would_create_cycle(&map, 5, Some(1)));
}

#[tokio::test]
async fn tree_slug_is_reserved_for_the_tree_route() {
    let db = Db::connect_lazy(&DbConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout: Duration::from_millis(200),
        ..DbConfig::default()
    });
    let input = CategoryInput {
        name: "Tree".into(),
        slug: " Tree ".into(),
        description: None,
        image_url: None,
        parent_id: None,
        order: 0,
        is_active: true,
    };
    let err = category_service::create_category(&db, input)
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Invalid);
    assert_eq!(err.message, msg::SLUG_RESERVED);
    assert_eq!(db.stats().acquired, 0);
}

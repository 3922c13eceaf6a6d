use std::{collections::HashMap, time::Duration};

use kalanow_store::{
    config::{AppConfig, DbConfig},
    db::split_statements,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn database_defaults_match_local_mysql() {
    let config = DbConfig::from_lookup(|_| None);
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 3306);
    assert_eq!(config.user, "root");
    assert_eq!(config.password, "");
    assert_eq!(config.name, "kalanow_db");
    assert_eq!(config.connection_limit, 10);
    assert_eq!(config.acquire_timeout, Duration::from_secs(30));
}

#[test]
fn database_settings_from_environment() {
    let config = DbConfig::from_lookup(lookup(&[
        ("DB_HOST", "db.internal"),
        ("DB_PORT", "3307"),
        ("DB_USER", "shop"),
        ("DB_PASSWORD", "s3cret"),
        ("DB_NAME", "shop_db"),
        ("DB_CONNECTION_LIMIT", "500"),
        ("DB_ACQUIRE_TIMEOUT_SECS", "5"),
    ]));
    assert_eq!(config.host, "db.internal");
    assert_eq!(config.port, 3307);
    assert_eq!(config.user, "shop");
    assert_eq!(config.name, "shop_db");
    assert_eq!(config.connection_limit, 100);
    assert_eq!(config.acquire_timeout, Duration::from_secs(5));
}

#[test]
fn unparsable_numbers_keep_defaults() {
    let config = DbConfig::from_lookup(lookup(&[("DB_PORT", "mysql"), ("DB_CONNECTION_LIMIT", "0")]));
    assert_eq!(config.port, 3306);
    assert_eq!(config.connection_limit, 1);
}

#[test]
fn app_settings() {
    let config = AppConfig::from_lookup(lookup(&[
        ("APP_PORT", "8080"),
        ("SESSION_SECRET", "k"),
        ("PAYMENT_DELAY_MS", "0"),
    ]));
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.session_secret.as_deref(), Some("k"));
    assert_eq!(config.session_ttl_hours, 24);
    assert_eq!(config.payment_delay, Duration::ZERO);

    let empty_secret = AppConfig::from_lookup(lookup(&[("SESSION_SECRET", "")]));
    assert_eq!(empty_secret.session_secret, None);
    assert_eq!(empty_secret.payment_delay, Duration::from_millis(1500));
}

#[test]
fn migration_files_split_into_statements() {
    let sql = "-- header\nCREATE TABLE a (id INT);\n\n-- second\nCREATE TABLE b (id INT);\n";
    assert_eq!(
        split_statements(sql),
        vec!["CREATE TABLE a (id INT);", "CREATE TABLE b (id INT);"]
    );
}

#[test]
fn bundled_migration_parses() {
    let sql = std::fs::read_to_string("migrations/0001_init.sql").unwrap();
    let statements = split_statements(&sql);
    assert_eq!(statements.len(), 9);
    assert!(statements.iter().all(|s| s.starts_with("CREATE TABLE IF NOT EXISTS")));
}

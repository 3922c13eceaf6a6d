use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, SqlxMySqlConnector, Statement};
use serde::Serialize;
use sqlx::{
    MySql, MySqlConnection, MySqlPool,
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    pool::PoolConnection,
};
use std::{
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::fs;
use utoipa::ToSchema;

use crate::config::DbConfig;

static GLOBAL: OnceLock<Db> = OnceLock::new();

/// Shared handle to the MySQL pool plus a SeaORM view over the same pool.
#[derive(Clone)]
pub struct Db {
    pool: MySqlPool,
    orm: DatabaseConnection,
    stats: Arc<PoolStats>,
}

#[derive(Debug, Default)]
struct PoolStats {
    acquired: AtomicU64,
    released: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PoolCounters {
    pub acquired: u64,
    pub released: u64,
}

impl PoolCounters {
    pub fn in_use(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// A connection checked out of the pool. Dropping it hands the connection
/// back and records the release.
pub struct Checkout {
    conn: PoolConnection<MySql>,
    stats: Arc<PoolStats>,
}

impl Deref for Checkout {
    type Target = MySqlConnection;

    fn deref(&self) -> &MySqlConnection {
        &self.conn
    }
}

impl DerefMut for Checkout {
    fn deref_mut(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// The SeaORM handle leased for one action. Counted like a [`Checkout`];
/// SeaORM draws pooled connections per statement while the lease is held.
pub struct OrmCheckout<'a> {
    orm: &'a DatabaseConnection,
    stats: Arc<PoolStats>,
}

impl Deref for OrmCheckout<'_> {
    type Target = DatabaseConnection;

    fn deref(&self) -> &DatabaseConnection {
        self.orm
    }
}

impl Drop for OrmCheckout<'_> {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn connect_options(config: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .charset("utf8mb4")
}

impl Db {
    /// Build the pool without opening any socket; the first checkout connects.
    pub fn connect_lazy(config: &DbConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.connection_limit)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(connect_options(config));
        Self::from_pool(pool)
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        let orm = SqlxMySqlConnector::from_sqlx_mysql_pool(pool.clone());
        Self {
            pool,
            orm,
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub async fn acquire(&self) -> Result<Checkout, sqlx::Error> {
        let conn = self.pool.acquire().await?;
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Checkout {
            conn,
            stats: Arc::clone(&self.stats),
        })
    }

    pub fn orm(&self) -> OrmCheckout<'_> {
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        OrmCheckout {
            orm: &self.orm,
            stats: Arc::clone(&self.stats),
        }
    }

    pub fn stats(&self) -> PoolCounters {
        PoolCounters {
            acquired: self.stats.acquired.load(Ordering::SeqCst),
            released: self.stats.released.load(Ordering::SeqCst),
        }
    }

    /// One diagnostic round-trip. Failure is logged, never fatal.
    pub async fn ping(&self) -> bool {
        let result = match self.acquire().await {
            Ok(mut conn) => sqlx::query("SELECT 1").execute(&mut *conn).await.map(|_| ()),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                tracing::info!("database connection established");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "database connection failed; queries will retry on demand");
                false
            }
        }
    }

    /// Close the pool. Waits for checked-out connections to come back.
    pub async fn shutdown(&self) {
        self.pool.close().await;
        let counters = self.stats();
        tracing::info!(
            acquired = counters.acquired,
            released = counters.released,
            "database pool closed"
        );
    }
}

/// Initialise the process-wide pool; later calls return the first instance.
pub fn init_global(config: &DbConfig) -> &'static Db {
    GLOBAL.get_or_init(|| Db::connect_lazy(config))
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(db: &Db) -> Result<()> {
    run_migrations_from(db, Path::new("migrations")).await
}

pub async fn run_migrations_from(db: &Db, dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let conn = db.orm();
    let backend = conn.get_database_backend();
    for file in files {
        let sql = fs::read_to_string(&file).await?;
        for stmt in split_statements(&sql) {
            conn.execute(Statement::from_string(backend, stmt)).await?;
        }
        tracing::info!(file = %file.display(), "migration applied");
    }

    Ok(())
}

/// Prepared statements cannot carry several commands, so migration files are
/// split on `;` with `--` comment lines removed.
pub fn split_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| format!("{stmt};"))
        .collect()
}

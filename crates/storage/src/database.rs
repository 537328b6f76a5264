//! Database abstraction layer
//!
//! This module owns the pooled SQLite connection and schema migrations.
//! Record stores borrow the pool and bind their own statements.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Database error types
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file path
    pub path: String,
    /// Maximum number of connections in pool
    pub max_connections: u32,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Enable WAL mode
    pub wal_mode: bool,
    /// Synchronous mode
    pub synchronous: SynchronousMode,
}

/// SQLite synchronous mode
#[derive(Debug, Clone, Copy)]
pub enum SynchronousMode {
    /// Off - no synchronization
    Off,
    /// Normal - synchronize at critical moments
    Normal,
    /// Full - synchronize after each write
    Full,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "greenroom.db".to_string(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(30),
            wal_mode: true,
            synchronous: SynchronousMode::Normal,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable WAL mode
    pub fn wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    /// Set synchronous mode
    pub fn synchronous(mut self, mode: SynchronousMode) -> Self {
        self.synchronous = mode;
        self
    }
}

/// Pooled SQLite database
///
/// Owns the connection pool shared by every record store. The pool is cheap
/// to clone out via [`pool`](Self::pool); the stores never manage
/// transactions beyond single-statement writes.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database with the given configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let mut options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path))
            .map_err(|e| DatabaseError::Config(e.to_string()))?
            .create_if_missing(true);

        if config.wal_mode {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        options = match config.synchronous {
            SynchronousMode::Off => options.synchronous(SqliteSynchronous::Off),
            SynchronousMode::Normal => options.synchronous(SqliteSynchronous::Normal),
            SynchronousMode::Full => options.synchronous(SqliteSynchronous::Full),
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Ok(Self { pool })
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run migrations
    ///
    /// Versions must be strictly increasing. Already-applied versions are
    /// skipped, so re-running the same migration list is a no-op.
    pub async fn migrate(&self, migrations: &[MigrationDefinition]) -> Result<()> {
        for pair in migrations.windows(2) {
            if pair[1].version <= pair[0].version {
                return Err(DatabaseError::Migration(format!(
                    "versions must be strictly increasing, got {} after {}",
                    pair[1].version, pair[0].version
                )));
            }
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                checksum TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let current_version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_optional(&self.pool)
            .await?
            .flatten();

        let current_version = current_version.unwrap_or(0);

        for migration in migrations {
            if migration.version > current_version {
                tracing::info!(
                    "Applying migration {} - {}",
                    migration.version,
                    migration.description
                );

                let mut tx = self.pool.begin().await?;

                sqlx::query(&migration.sql).execute(&mut *tx).await?;

                sqlx::query(
                    "INSERT INTO _migrations (version, description, checksum) VALUES (?, ?, ?)",
                )
                .bind(migration.version)
                .bind(&migration.description)
                .bind(&migration.checksum)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;

                tracing::info!("Migration {} applied successfully", migration.version);
            }
        }

        Ok(())
    }

    /// Get current migration version
    pub async fn current_version(&self) -> Result<i64> {
        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_optional(&self.pool)
            .await?
            .flatten();

        Ok(version.unwrap_or(0))
    }

    /// Check if the database is healthy
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Migration definition
#[derive(Debug, Clone)]
pub struct MigrationDefinition {
    /// Migration version number
    pub version: i64,
    /// Migration description
    pub description: String,
    /// SQL to execute
    pub sql: String,
    /// Checksum for verification
    pub checksum: String,
}

impl MigrationDefinition {
    /// Create a new migration definition
    pub fn new(version: i64, description: impl Into<String>, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let checksum = format!("{:x}", md5::compute(&sql));

        Self { version, description: description.into(), sql, checksum }
    }
}

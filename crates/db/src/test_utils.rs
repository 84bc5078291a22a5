//! Test database helpers.
//!
//! Integration tests run against a real Postgres instance, usually the
//! one from `docker-compose` on port 5433. Each test that writes data
//! creates its own throwaway database so tests can run in parallel.

use ladle_common::IdGenerator;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use tracing::info;

/// Connection settings for the test Postgres instance.
///
/// Every field can be overridden through `TEST_DB_*` environment
/// variables; the defaults match the compose file.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: env_or("TEST_DB_HOST", "localhost"),
            port: env_or("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: env_or("TEST_DB_USER", "ladle_test"),
            password: env_or("TEST_DB_PASSWORD", "ladle_test"),
            database: env_or("TEST_DB_NAME", "ladle_test"),
        }
    }
}

impl TestDbConfig {
    /// Connection URL for the configured test database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Connection URL for the maintenance `postgres` database, used to
    /// create and drop throwaway databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A connected test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect to the shared test database from the default config.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect to the test database described by `config`.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        info!(database = %config.database, "Connected to test database");

        Ok(Self { conn, config })
    }

    /// Create a throwaway database with a unique name and connect to it.
    ///
    /// The name carries a ULID suffix, so parallel tests never collide.
    /// Call [`drop_database`](Self::drop_database) at the end of the test.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        config.database = format!("ladle_test_{}", IdGenerator::new().generate());

        let maintenance = Database::connect(&config.postgres_url()).await?;
        maintenance
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{}\"", config.database),
            ))
            .await?;
        maintenance.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        info!(database = %config.database, "Created unique test database");

        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Truncate every application table, keeping the schema and the
    /// migration bookkeeping intact.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let rows = self
            .conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
            ))
            .await?;

        let tables: Vec<String> = rows
            .iter()
            .filter_map(|row| row.try_get::<String>("", "tablename").ok())
            .filter(|name| name != "seaql_migrations")
            .map(|name| format!("\"{name}\""))
            .collect();

        if !tables.is_empty() {
            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("TRUNCATE TABLE {} CASCADE", tables.join(", ")),
                ))
                .await?;
        }

        info!("Cleaned up test database");
        Ok(())
    }

    /// Drop a throwaway database created by [`create_unique`](Self::create_unique).
    ///
    /// Consumes self: the connection has to be closed before the drop,
    /// and Postgres refuses to drop a database with live sessions, so
    /// stray sessions are terminated first.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let maintenance = Database::connect(&self.config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        maintenance
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok();

        maintenance
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database),
            ))
            .await?;
        maintenance.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_compose_port() {
        let config = TestDbConfig::default();
        assert_eq!(config.port, 5433);
        assert_eq!(config.database, "ladle_test");
    }

    #[test]
    fn test_database_url_shape() {
        let config = TestDbConfig {
            host: "db".to_string(),
            port: 5433,
            username: "u".to_string(),
            password: "p".to_string(),
            database: "ladle_test".to_string(),
        };

        assert_eq!(config.database_url(), "postgres://u:p@db:5433/ladle_test");
        assert_eq!(config.postgres_url(), "postgres://u:p@db:5433/postgres");
    }
}

use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::config::{self, Config};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Схема БД. Все выражения идемпотентны и выполняются при каждом запуске.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_seller",
        r#"
        CREATE TABLE IF NOT EXISTS a001_seller (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            department TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_team",
        r#"
        CREATE TABLE IF NOT EXISTS a002_team (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            lead_id TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_team_member",
        r#"
        CREATE TABLE IF NOT EXISTS a002_team_member (
            id TEXT PRIMARY KEY NOT NULL,
            team_id TEXT NOT NULL,
            seller_id TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );
        "#,
    ),
    (
        "a002_team_member_seller_idx",
        "CREATE INDEX IF NOT EXISTS idx_a002_team_member_seller ON a002_team_member (seller_id);",
    ),
    (
        "a003_sales_target",
        r#"
        CREATE TABLE IF NOT EXISTS a003_sales_target (
            id TEXT PRIMARY KEY NOT NULL,
            seller_id TEXT NOT NULL,
            month TEXT NOT NULL,
            target_accounts INTEGER NOT NULL DEFAULT 0,
            target_gross TEXT NOT NULL DEFAULT '0',
            target_cash_in TEXT NOT NULL DEFAULT '0',
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_sales_target_key",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_a003_sales_target_seller_month ON a003_sales_target (seller_id, month);",
    ),
    (
        "a004_sales_disposition",
        r#"
        CREATE TABLE IF NOT EXISTS a004_sales_disposition (
            id TEXT PRIMARY KEY NOT NULL,
            seller_id TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'sale',
            client_name TEXT,
            gross_value TEXT NOT NULL DEFAULT '0',
            cash_in TEXT NOT NULL DEFAULT '0',
            remaining TEXT NOT NULL DEFAULT '0',
            created_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "a004_sales_disposition_seller_idx",
        "CREATE INDEX IF NOT EXISTS idx_a004_sales_disposition_seller ON a004_sales_disposition (seller_id, created_at);",
    ),
    (
        "system_log",
        r#"
        CREATE TABLE IF NOT EXISTS system_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            category TEXT NOT NULL,
            message TEXT NOT NULL
        );
        "#,
    ),
];

/// Создать недостающие таблицы и индексы
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        tracing::debug!("Ensuring schema object {}", name);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

fn build_sqlite_url(path: &std::path::Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

pub async fn initialize_database(cfg: &Config) -> anyhow::Result<()> {
    let db_file = config::get_database_path(cfg)?;
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file
    } else {
        std::env::current_dir()?.join(db_file)
    };

    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Opening database {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// БД в памяти с полной схемой для тестов репозиториев
#[cfg(test)]
pub async fn connect_in_memory() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    // у каждого соединения пула иначе была бы своя пустая БД
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite must open");
    bootstrap_schema(&conn).await.expect("schema bootstrap");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_forms() {
        assert_eq!(
            build_sqlite_url(std::path::Path::new("/srv/crm/app.db")),
            "sqlite:///srv/crm/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(std::path::Path::new("C:\\crm\\app.db")),
            "sqlite:///C:/crm/app.db?mode=rwc"
        );
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = connect_in_memory().await;
        bootstrap_schema(&conn).await.unwrap();

        let tables = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE 'a00%' ORDER BY name;"
                    .to_string(),
            ))
            .await
            .unwrap();
        let names: Vec<String> = tables
            .iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "a001_seller",
                "a002_team",
                "a002_team_member",
                "a003_sales_target",
                "a004_sales_disposition",
            ]
        );
    }
}

use crate::constants::DB_ACQUIRE_TIMEOUT;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::info;
use tracing::log::LevelFilter;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    let Some((protocol, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    // user:pass@host keeps the user and hides the password
    if let Some((user_info, host_and_path)) = rest.split_once('@') {
        if let Some((username, _)) = user_info.split_once(':') {
            return format!("{}://{}:***@{}", protocol, username, host_and_path);
        }
    }

    url.to_string()
}

/// `user@host:port/database` for log and error messages; never includes the password.
pub fn describe_target(options: &PgConnectOptions) -> String {
    format!(
        "{}@{}:{}/{}",
        options.get_username(),
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or(options.get_username())
    )
}

/// Connect with an acquire timeout and enriched error messages.
///
/// Catalog queries can be slow on large schemas, so slow statement logging is
/// switched off to keep sqlx from echoing them. `label` names the database in
/// error messages.
pub async fn connect_to_database(options: PgConnectOptions, label: &str) -> Result<PgPool> {
    let target = describe_target(&options);
    let options = options.log_slow_statements(LevelFilter::Off, Duration::from_secs(0));

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to {} at {}", label, target))?;

    info!("Connected to {} at {}", label, target);
    Ok(pool)
}

/// Open a read-only transaction with a single snapshot for every catalog read.
///
/// The search path is narrowed to `pg_catalog` for the transaction, so
/// `pg_get_viewdef` and friends schema-qualify every name they print.
/// Callers roll it back when done; nothing is ever written through it.
pub async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await
        .context("Failed to set snapshot isolation")?;

    sqlx::query("SET LOCAL search_path = pg_catalog")
        .execute(&mut *tx)
        .await
        .context("Failed to set catalog search path")?;

    Ok(tx)
}

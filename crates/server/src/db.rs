use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use survey_migration::{Migrator, MigratorTrait};
use tracing::info;

pub async fn init_pool_and_migrate(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // Every pooled connection to `sqlite::memory:` would open its own empty database.
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {database_url}"))?;

    Migrator::up(&db, None)
        .await
        .context("failed to run database migrations")?;
    info!("database migrations applied");

    Ok(db)
}

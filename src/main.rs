use anyhow::Context;
use checkin_store::{config::Config, db};
use tracing::info;
use tracing_appender::rolling;

/// Opens (or creates) the configured database and brings its schema up to date.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "checkin-store.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(database_url = %config.database_url, "Initializing database");

    let pool = db::init_db(&config)
        .await
        .context("failed to connect to database")?;

    db::migrate(&pool)
        .await
        .context("failed to apply schema migrations")?;

    let applied = db::MIGRATOR.iter().count();
    info!(migrations = applied, "Database schema is up to date");

    pool.close().await;
    Ok(())
}

use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use studiosync_db::schema::initialize_database;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

    info!("Connecting to database...");
    let db_pool = studiosync_db::create_pool(&database_url).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}

use clap::Parser;
use engine::SplitTolerance;
use migration::{Migrator, MigratorTrait};
use server::Identity;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = settings::Cli::parse();
    let settings = settings::Settings::new(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let database = sea_orm::Database::connect(&settings.database.url).await?;
    Migrator::up(&database, None).await?;

    let tolerance = SplitTolerance::from_setting(settings.splits.tolerance.as_deref());
    tracing::info!("split tolerance set to {}", tolerance.cents());

    let engine = engine::Engine::builder()
        .database(database)
        .split_tolerance(tolerance)
        .build()
        .await?;

    let ttl = settings.token_ttl()?;
    let identity = match &settings.identity.secret {
        Some(secret) => Identity::new(secret.as_bytes(), ttl)?,
        None => {
            tracing::warn!("no identity.secret configured, tokens will not survive a restart");
            Identity::generate(ttl)?
        }
    };

    server::run(engine, identity, settings.server_addr()?).await;
    Ok(())
}

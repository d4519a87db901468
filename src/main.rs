use anyhow::{Context, Result};

use tunedb::{Config, Pool, SurveyDb, TuneDb, models::Category, schema};

/// Prepares the database: creates missing tables, seeds the survey buildings and reports
/// what is stored.
#[tokio::main]
async fn main() -> Result<()> {
    // Begin logger
    env_logger::init();

    let config = Config::from_env().context("Invalid TUNEDB_* configuration.")?;
    log::info!("Using database at {}", config.db_path.display());

    let pool = Pool::open(&config)
        .with_context(|| format!("Connection to {} failed!", config.db_path.display()))?;

    schema::initialize_db(&pool).await.context("Could not create tables.")?;

    let survey = SurveyDb::new(pool.clone(), &config);
    let added = survey.seed_buildings().await.context("Could not seed survey buildings.")?;
    if added == 0 {
        log::info!("Survey buildings already in database.");
    }

    let tune = TuneDb::new(pool.clone(), &config);
    for category in [Category::Users, Category::Sessions, Category::Inputs] {
        let rows = tune
            .fetch_all(category)
            .await
            .with_context(|| format!("Could not count {}.", category.as_str()))?;
        log::info!("{}: {} row(s)", category.as_str(), rows.len());
    }

    let responses = survey.fetch_all_responses().await?;
    log::info!("survey responses: {} row(s)", responses.len());

    pool.close();
    Ok(())
}

use cardnorm_analyze::DatabaseStore;
use cardnorm_config::Config;
use cardnorm_core::{AnalysisStatus, CardRepo};
use tracing::info;

/// Prints the configuration and, when the database is reachable, record
/// counts per analysis status.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== cardnorm Configuration ===\n");

        println!("Database:");
        println!("  URL: {}", mask_database_url(&config.database.url));

        info!("Testing database connection");
        match DatabaseStore::connect(&config.database.url).await {
            Ok(store) => {
                println!("  Status: Connected");
                for status in [
                    AnalysisStatus::Pending,
                    AnalysisStatus::Done,
                    AnalysisStatus::Errored,
                ] {
                    println!("  {status}: {}", store.count_by_status(status).await?);
                }
                println!("  cards: {}", store.count_cards().await?);
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Analysis:");
        match config.analysis.batch_limit {
            Some(limit) => println!("  Batch Limit: {limit}"),
            None => println!("  Batch Limit: (none)"),
        }
        match config.analysis.time_budget_secs {
            Some(secs) => println!("  Time Budget: {secs}s"),
            None => println!("  Time Budget: (none)"),
        }
        println!();

        println!("Logging:");
        println!("  Level: {}", config.logging.max_level());

        Ok(())
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use cardnorm_config::Config;
use clap::{Parser, Subcommand};
use command::{
    AnalyzeInput, AnalyzeStrategy, CheckRulesStrategy, CommandStrategy, InfoStrategy,
    InitStrategy, ResetInput, ResetStrategy, VersionStrategy,
};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "cardnorm")]
#[command(about = "Normalize captured card pages into structured cards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse pending raw records
    Analyze {
        /// Maximum number of records to take
        #[arg(short, long)]
        limit: Option<u64>,

        /// Stop starting new records after this many seconds
        #[arg(short, long)]
        budget_secs: Option<u64>,

        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move records back to pending
    Reset {
        /// Card number whose records should be re-analysed
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        card_number: Option<String>,

        /// Reset every record
        #[arg(long)]
        all: bool,
    },
    /// Check active rules against their examples
    CheckRules,
    /// Show configuration and database status
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` must work before a config file exists.
    let level = Config::load_or_default()
        .map(|c| c.logging.max_level())
        .unwrap_or(tracing::Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Analyze {
            limit,
            budget_secs,
            json,
        } => {
            AnalyzeStrategy
                .execute(AnalyzeInput {
                    limit,
                    budget_secs,
                    json,
                })
                .await?;
        }
        Commands::Reset { card_number, all } => {
            let input = match card_number {
                Some(card_number) if !all => ResetInput::CardNumber(card_number),
                _ => ResetInput::All,
            };
            ResetStrategy.execute(input).await?;
        }
        Commands::CheckRules => CheckRulesStrategy.execute(()).await?,
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}

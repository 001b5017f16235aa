use cardnorm_analyze::AnalysisOrchestrator;
use cardnorm_config::Config;

#[derive(Debug, Clone)]
pub enum ResetInput {
    CardNumber(String),
    All,
}

/// Moves raw records back to pending so the next batch re-analyses them.
#[derive(Debug, Clone, Copy)]
pub struct ResetStrategy;

impl super::CommandStrategy for ResetStrategy {
    type Input = ResetInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let orchestrator = AnalysisOrchestrator::new(super::open_store(&config).await?);

        let count = match input {
            ResetInput::CardNumber(card_number) => orchestrator.reset(&card_number).await?,
            ResetInput::All => orchestrator.reset_all().await?,
        };
        println!("Reset {count} records to pending");
        Ok(())
    }
}

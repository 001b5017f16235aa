use cardnorm_analyze::{AnalysisOrchestrator, BatchOptions, StopSignal};
use cardnorm_config::Config;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    /// Overrides `analysis.batch_limit`.
    pub limit: Option<u64>,
    /// Overrides `analysis.time_budget_secs`.
    pub budget_secs: Option<u64>,
    /// Print the batch summary as JSON instead of text.
    pub json: bool,
}

/// Runs one analysis batch over the pending raw records.
///
/// Ctrl-C stops the batch between records; whatever was not reached stays
/// pending for the next run.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeStrategy;

impl super::CommandStrategy for AnalyzeStrategy {
    type Input = AnalyzeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        let stop = StopSignal::new();
        let on_ctrl_c = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current record");
                on_ctrl_c.stop();
            }
        });

        let options = BatchOptions {
            limit: input.limit.or(config.analysis.batch_limit),
            time_budget: input
                .budget_secs
                .map(Duration::from_secs)
                .or_else(|| config.analysis.time_budget()),
            page_size: config.analysis.page_size,
        };
        let orchestrator = AnalysisOrchestrator::new(store).with_stop_signal(stop);
        let summary = orchestrator.run_batch(options).await?;

        if input.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!("Run {}", summary.run_id);
        println!("  Processed: {}", summary.processed);
        println!("  Succeeded: {}", summary.succeeded);
        println!("  Failed:    {}", summary.failed);
        if summary.stopped_early {
            println!("  Stopped early; remaining records are still pending");
        }
        for failure in &summary.failures {
            println!("  ✗ {}: {}", failure.card_number, failure.note);
        }
        for problem in &summary.rule_problems {
            warn!("{problem}");
        }
        Ok(())
    }
}

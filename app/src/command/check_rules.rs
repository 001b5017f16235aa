use cardnorm_analyze::AnalysisOrchestrator;
use cardnorm_config::Config;

/// Checks every active rule against its curated examples.
///
/// Exits with an error when any rule fails, so it can gate a rule import.
#[derive(Debug, Clone, Copy)]
pub struct CheckRulesStrategy;

impl super::CommandStrategy for CheckRulesStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let orchestrator = AnalysisOrchestrator::new(super::open_store(&config).await?);

        let problems = orchestrator.check_rules().await?;
        if problems.is_empty() {
            println!("All active rules match their examples");
            return Ok(());
        }
        for problem in &problems {
            println!("✗ {problem}");
        }
        anyhow::bail!("{} rule problems found", problems.len())
    }
}

//! One strategy type per CLI subcommand, dispatched statically from `main`.

use cardnorm_analyze::DatabaseStore;
use cardnorm_config::Config;
use std::sync::Arc;
use tracing::info;

mod analyze;
mod check_rules;
mod info;
mod init;
mod reset;
mod version;

pub use analyze::{AnalyzeInput, AnalyzeStrategy};
pub use check_rules::CheckRulesStrategy;
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use reset::{ResetInput, ResetStrategy};
pub use version::VersionStrategy;

async fn open_store(config: &Config) -> anyhow::Result<Arc<DatabaseStore>> {
    info!("Opening card database");
    Ok(Arc::new(DatabaseStore::connect(&config.database.url).await?))
}

/// Contract shared by every command.
///
/// Each strategy names its own input type, so `main` hands over parsed
/// arguments without boxing or downcasting.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

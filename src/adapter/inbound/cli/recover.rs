//! Handler for the `recover` command.

use tracing::warn;

use crate::application::recovery::RecoveryOutcome;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::context::AppContext;

use super::field;

/// Run a single recovery pass against the configured database.
pub async fn execute(config: Config) -> Result<()> {
    let ctx = AppContext::build(config)?;

    match ctx.recovery.recover().await? {
        RecoveryOutcome::Completed(report) => {
            println!("Recovery complete");
            field("Fresh start", report.fresh_start);
            field("Active users", report.users);
            field("Reconciled", report.reconciled);
            field("Reconnected", report.reconnected);
            field("Skipped", report.skipped);
            field("Failed", report.failed);
        }
        RecoveryOutcome::AlreadyRunning => {
            warn!("Recovery already in progress");
        }
    }
    Ok(())
}

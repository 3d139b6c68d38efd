//! Handler for the `run` command.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::outbound::feed::SimulatedTradeFeed;
use crate::application::recovery::RecoveryOutcome;
use crate::domain::SystemStateUpdate;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::context::AppContext;
use crate::port::outbound::notifier::Notifier;

#[cfg(feature = "telegram")]
fn build_notifier(ctx: &AppContext) -> Arc<dyn Notifier> {
    use crate::adapter::telegram::TelegramNotifier;
    info!("Telegram notifier enabled");
    Arc::new(TelegramNotifier::new(ctx.config.telegram_token.expose()))
}

#[cfg(not(feature = "telegram"))]
fn build_notifier(_ctx: &AppContext) -> Arc<dyn Notifier> {
    use crate::port::outbound::notifier::NullNotifier;
    warn!("Built without the telegram feature; alerts are discarded");
    Arc::new(NullNotifier)
}

/// Execute the run command.
///
/// Recovery runs to completion before the bot starts. A recovery error is
/// returned to the caller and nothing else is started.
pub async fn execute(config: Config) -> Result<()> {
    let ctx = AppContext::build(config)?;
    info!(context = ?ctx, "insiderwatch starting");

    match ctx.recovery.recover().await? {
        RecoveryOutcome::Completed(report) => info!(
            fresh_start = report.fresh_start,
            users = report.users,
            reconciled = report.reconciled,
            reconnected = report.reconnected,
            failed = report.failed,
            "Startup recovery finished"
        ),
        RecoveryOutcome::AlreadyRunning => warn!("Startup recovery skipped, already running"),
    }
    ctx.recovery
        .update_system_state(SystemStateUpdate::version(env!("CARGO_PKG_VERSION")))
        .await;

    let notifier = build_notifier(&ctx);
    let scheduler = Arc::new(ctx.scheduler(Arc::new(SimulatedTradeFeed::new()), notifier));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run(shutdown_rx).await }
    });

    #[cfg(feature = "telegram")]
    let listener = crate::adapter::telegram::spawn_command_listener(
        ctx.config.telegram_token.expose(),
        ctx.control(),
    );

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }
    #[cfg(feature = "telegram")]
    listener.abort();

    ctx.client.logout();
    info!("insiderwatch stopped");
    Ok(())
}

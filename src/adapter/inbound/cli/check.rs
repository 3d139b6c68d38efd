//! Handler for the `check` command.

use crate::error::Result;
use crate::infrastructure::config::Config;

use super::field;

/// Print a summary of an already validated configuration.
pub fn execute(config: &Config) -> Result<()> {
    println!("Configuration is valid");
    field("Database", &config.database_path);
    field(
        "Check interval",
        format!("{} minutes", config.scheduler.check_interval_minutes),
    );
    field(
        "Portfolio interval",
        format!("{} minutes", config.scheduler.portfolio_interval_minutes),
    );
    field(
        "Brokerage",
        if config.brokerage_enabled() {
            "enabled"
        } else {
            "disabled (set BROKER_USERNAME and BROKER_PASSWORD)"
        },
    );
    field(
        "Session TTL",
        format!("{} minutes", config.broker.session_ttl_minutes),
    );
    field("Retry attempts", config.broker.retry.max_attempts);
    field("Log level", &config.logging.level);
    Ok(())
}

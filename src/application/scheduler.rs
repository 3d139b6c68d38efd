//! Periodic jobs: insider trade checks and portfolio refreshes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::application::broker_client::BrokerClient;
use crate::application::render;
use crate::domain::SystemStateUpdate;
use crate::error::Result;
use crate::port::outbound::feed::TradeFeed;
use crate::port::outbound::notifier::Notifier;
use crate::port::outbound::store::{
    RecordStore, SessionStore, SystemStateStore, TradeStore, UserStore,
};

/// Job timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Delay before the first trade check.
    pub initial_delay: Duration,
    /// Period of the trade check.
    pub check_interval: Duration,
    /// Period of the portfolio refresh.
    pub portfolio_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            check_interval: Duration::from_secs(30 * 60),
            portfolio_interval: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Job {
    TradeCheck,
    PortfolioRefresh,
}

impl Job {
    const fn as_str(self) -> &'static str {
        match self {
            Self::TradeCheck => "trade_check",
            Self::PortfolioRefresh => "portfolio_refresh",
        }
    }
}

/// Runs the bot's periodic jobs until shutdown.
pub struct Scheduler {
    store: Arc<dyn RecordStore>,
    feed: Arc<dyn TradeFeed>,
    notifier: Arc<dyn Notifier>,
    client: Arc<BrokerClient>,
    brokerage_enabled: bool,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        feed: Arc<dyn TradeFeed>,
        notifier: Arc<dyn Notifier>,
        client: Arc<BrokerClient>,
        brokerage_enabled: bool,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            store,
            feed,
            notifier,
            client,
            brokerage_enabled,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    /// Fetch the feed and alert every active user about trades not yet
    /// recorded in the store.
    ///
    /// Returns the number of new trades.
    pub async fn check_trades(&self) -> Result<usize> {
        info!("Starting insider trade check");
        let trades = self.feed.fetch_recent().await?;
        // Users first: a trade is only recorded once its recipients are known.
        let users = self.store.list_active_users().await?;

        let mut fresh = Vec::new();
        for trade in trades {
            if self.store.save_trade(&trade).await? {
                fresh.push(trade);
            } else {
                debug!(
                    company = %trade.company_name,
                    insider = %trade.insider_name,
                    "Trade already relayed"
                );
            }
        }

        if !fresh.is_empty() {
            for trade in &fresh {
                let text = trade.alert_text();
                for user in &users {
                    self.notifier.notify(user.chat_id, text.clone());
                }
            }
            info!(trades = fresh.len(), users = users.len(), "Sent insider trade alerts");
        }

        self.store
            .update_system_state(SystemStateUpdate::trade_check(Utc::now()))
            .await?;
        info!(new_trades = fresh.len(), "Insider trade check completed");
        Ok(fresh.len())
    }

    /// Send a portfolio summary to every user holding a valid session.
    ///
    /// Returns the number of users updated. Does nothing when brokerage
    /// integration is off or the client is disconnected.
    pub async fn refresh_portfolios(&self) -> Result<usize> {
        if !self.brokerage_enabled {
            debug!("Brokerage integration disabled, skipping portfolio refresh");
            return Ok(0);
        }
        if !self.client.is_connected() {
            warn!("Brokerage client not connected, skipping portfolio refresh");
            return Ok(0);
        }

        info!("Starting portfolio refresh");
        let Some(positions) = self.client.portfolio().await else {
            warn!("Portfolio unavailable, skipping refresh");
            return Ok(0);
        };
        let currency = self
            .client
            .account()
            .map_or_else(|| "EUR".to_string(), |a| a.currency);
        let summary = render::portfolio(&positions, &currency);

        let now = Utc::now();
        let mut updated = 0;
        for user in self.store.list_active_users().await? {
            match self.store.get_active_session(user.id).await {
                Ok(Some(session)) if session.is_valid_at(now) => {
                    self.notifier.notify(user.chat_id, summary.clone());
                    updated += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(user_id = %user.id, error = %e, "Failed to load session for portfolio refresh");
                }
            }
        }

        self.store
            .update_system_state(SystemStateUpdate::analysis_run(Utc::now()))
            .await?;
        info!(users = updated, "Portfolio refresh completed");
        Ok(updated)
    }

    async fn notify_admins(&self, text: &str) {
        match self.store.list_active_users().await {
            Ok(users) => {
                for admin in users.into_iter().filter(|u| u.is_admin) {
                    self.notifier.notify(admin.chat_id, text.to_string());
                }
            }
            Err(e) => error!(error = %e, "Failed to list admins"),
        }
    }

    async fn run_job(&self, job: Job) {
        let result = match job {
            Job::TradeCheck => self.check_trades().await.map(|_| ()),
            Job::PortfolioRefresh => self.refresh_portfolios().await.map(|_| ()),
        };
        if let Err(e) = result {
            let job = job.as_str();
            error!(job, error = %e, "Scheduled job failed");
            self.notify_admins(&format!("Error during {job}: {e}")).await;
        }
    }

    /// Run both jobs on their intervals until `shutdown` flips to true or
    /// its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let start = Instant::now();
        let mut trade_tick = interval_at(
            start + self.settings.initial_delay,
            self.settings.check_interval,
        );
        trade_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut portfolio_tick = interval_at(
            start + self.settings.portfolio_interval,
            self.settings.portfolio_interval,
        );
        portfolio_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            check_interval_secs = self.settings.check_interval.as_secs(),
            portfolio = self.brokerage_enabled,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scheduler stopping");
                        break;
                    }
                }
                _ = trade_tick.tick() => self.run_job(Job::TradeCheck).await,
                _ = portfolio_tick.tick(), if self.brokerage_enabled => {
                    self.run_job(Job::PortfolioRefresh).await;
                }
            }
        }
    }
}

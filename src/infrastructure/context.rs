//! Composition root for runtime wiring.
//!
//! [`AppContext`] is built once in `main` and handed to every component that
//! needs shared services. There are no process-wide singletons.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::broker::SimulatedBroker;
use crate::adapter::outbound::sqlite::{open, SqliteRecordStore};
use crate::adapter::telegram::{ControlSettings, TelegramControl};
use crate::application::broker_client::BrokerClient;
use crate::application::recovery::RecoveryManager;
use crate::application::scheduler::Scheduler;
use crate::application::users::UserDirectory;
use crate::application::vault::CredentialVault;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::crypto::CredentialCipher;
use crate::port::outbound::brokerage::BrokerageBackend;
use crate::port::outbound::feed::TradeFeed;
use crate::port::outbound::notifier::Notifier;
use crate::port::outbound::store::RecordStore;

/// Shared services for one process.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub users: UserDirectory,
    pub client: Arc<BrokerClient>,
    pub vault: CredentialVault,
    pub recovery: Arc<RecoveryManager>,
}

impl AppContext {
    /// Open the SQLite database named in `config` and wire the simulated
    /// brokerage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or if
    /// the encryption key is unusable.
    pub fn build(config: Config) -> Result<Self> {
        let pool = open(&config.database_path)?;
        info!(path = %config.database_path, "Opened record database");
        let store = Arc::new(SqliteRecordStore::new(pool));
        Self::with_parts(config, store, Arc::new(SimulatedBroker::new()))
    }

    /// Wire the context around an existing store and backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the encryption key is unusable.
    pub fn with_parts<S>(
        config: Config,
        store: Arc<S>,
        backend: Arc<dyn BrokerageBackend>,
    ) -> Result<Self>
    where
        S: RecordStore + 'static,
    {
        let cipher = CredentialCipher::new(config.encryption_key.expose().as_bytes())?;
        let client = Arc::new(BrokerClient::new(backend, config.broker.retry.clone()));
        let recovery = Arc::new(
            RecoveryManager::new(
                store.clone(),
                client.clone(),
                config.broker.credentials.clone(),
            )
            .with_session_ttl(config.broker.session_ttl()),
        );

        Ok(Self {
            users: UserDirectory::new(store.clone()),
            vault: CredentialVault::new(store.clone(), cipher),
            store,
            client,
            recovery,
            config,
        })
    }

    /// Scheduler for the periodic jobs, delivering through `notifier`.
    #[must_use]
    pub fn scheduler(&self, feed: Arc<dyn TradeFeed>, notifier: Arc<dyn Notifier>) -> Scheduler {
        Scheduler::new(
            self.store.clone(),
            feed,
            notifier,
            self.client.clone(),
            self.config.brokerage_enabled(),
            self.config.scheduler_settings(),
        )
    }

    /// Command executor for the chat bot.
    #[must_use]
    pub fn control(&self) -> TelegramControl {
        TelegramControl::new(
            self.users.clone(),
            self.store.clone(),
            self.client.clone(),
            self.recovery.clone(),
            self.vault.clone(),
            ControlSettings {
                check_interval_minutes: self.config.scheduler.check_interval_minutes,
                log_level: self.config.logging.level.clone(),
            },
        )
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("database", &self.config.database_path)
            .field("brokerage_enabled", &self.config.brokerage_enabled())
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::application::recovery::RecoveryOutcome;
    use crate::domain::{ChatId, NewUser};
    use crate::port::outbound::notifier::NullNotifier;
    use crate::port::outbound::store::{SessionStore, UserStore};
    use crate::testkit::broker::ScriptedBroker;
    use crate::testkit::config::config_from_pairs;
    use crate::testkit::feed::FailingFeed;

    #[tokio::test]
    async fn build_opens_database_and_recovers_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.db");
        let config = config_from_pairs(&[("DATABASE_URL", path.to_str().unwrap())]);

        let ctx = AppContext::build(config).unwrap();
        let outcome = ctx.recovery.recover().await.unwrap();

        match outcome {
            RecoveryOutcome::Completed(report) => {
                assert!(report.fresh_start);
                assert_eq!(report.users, 0);
            }
            RecoveryOutcome::AlreadyRunning => panic!("no concurrent recovery"),
        }
        assert!(path.exists());
    }

    #[tokio::test]
    async fn recovery_uses_configured_credentials_and_ttl() {
        let config = config_from_pairs(&[
            ("BROKER_USERNAME", "svc"),
            ("BROKER_PASSWORD", "pw"),
            ("BROKER_SESSION_TTL_MINUTES", "90"),
        ]);
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser::new(ChatId::new(11)))
            .await
            .unwrap();

        let ctx =
            AppContext::with_parts(config, store.clone(), Arc::new(ScriptedBroker::accepting()))
                .unwrap();
        assert!(ctx.recovery.integration_enabled());
        assert_eq!(ctx.recovery.session_ttl(), chrono::Duration::minutes(90));

        ctx.recovery.recover().await.unwrap();
        let session = store.get_active_session(user.id).await.unwrap();
        assert!(session.is_some());
    }

    #[tokio::test]
    async fn control_and_scheduler_share_the_store() {
        let config = config_from_pairs(&[("CHECK_INTERVAL_MINUTES", "15")]);
        let store = Arc::new(MemoryStore::new());
        let ctx = AppContext::with_parts(config, store, Arc::new(ScriptedBroker::accepting()))
            .unwrap();

        let control = ctx.control();
        let reply = control
            .respond(NewUser::new(ChatId::new(5)), "/settings")
            .await
            .unwrap();
        assert!(reply.contains("every 15 minutes"));

        control
            .respond(NewUser::new(ChatId::new(5)), "/start")
            .await
            .unwrap();
        assert_eq!(ctx.users.active().await.unwrap().len(), 1);

        let scheduler = ctx.scheduler(Arc::new(FailingFeed), Arc::new(NullNotifier));
        assert_eq!(scheduler.settings().check_interval.as_secs(), 15 * 60);
    }
}

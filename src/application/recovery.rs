//! Startup state recovery.
//!
//! [`RecoveryManager::recover`] brings persisted brokerage sessions back in
//! line with reality after a restart. For every active user it keeps a
//! still-valid session untouched, and otherwise tries to log in again and
//! store a fresh session. One user's failure never stops the pass; only
//! store failures at the top level (reading system state, listing users)
//! propagate.
//!
//! Only one recovery pass runs at a time. A second call while a pass is in
//! flight returns [`RecoveryOutcome::AlreadyRunning`] without touching
//! anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::application::broker_client::BrokerClient;
use crate::domain::{BrokerCredentials, BrokerSession, NewSession, Session, SystemStateUpdate, User};
use crate::error::Result;
use crate::port::outbound::store::{RecordStore, SessionStore, SystemStateStore, UserStore};

/// Default lifetime of a session created by recovery (30 hours).
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30 * 60;

/// Counters describing one completed recovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Whether no system state existed before this pass.
    pub fresh_start: bool,
    /// Active users examined.
    pub users: usize,
    /// Users whose stored session was still valid.
    pub reconciled: usize,
    /// Users who received a new session.
    pub reconnected: usize,
    /// Users left without a session because brokerage integration is off.
    pub skipped: usize,
    /// Users whose reconnection failed.
    pub failed: usize,
}

/// Result of [`RecoveryManager::recover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    Completed(RecoveryReport),
    AlreadyRunning,
}

impl RecoveryOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&RecoveryReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::AlreadyRunning => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserRecovery {
    Reconciled,
    Reconnected,
    Skipped,
    Failed,
}

/// Clears the in-progress flag on every exit path.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Reconciles stored sessions with the brokerage on startup.
pub struct RecoveryManager {
    store: Arc<dyn RecordStore>,
    client: Arc<BrokerClient>,
    credentials: Option<BrokerCredentials>,
    session_ttl: Duration,
    in_progress: AtomicBool,
}

impl RecoveryManager {
    /// `credentials` enables reconnection when present and complete.
    pub fn new(
        store: Arc<dyn RecordStore>,
        client: Arc<BrokerClient>,
        credentials: Option<BrokerCredentials>,
    ) -> Self {
        Self {
            store,
            client,
            credentials: credentials.filter(BrokerCredentials::is_complete),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Override the lifetime given to sessions created during recovery.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Whether brokerage reconnection is configured.
    #[must_use]
    pub fn integration_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether a recovery pass is currently running.
    #[must_use]
    pub fn is_recovering(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one recovery pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the system state or the active user list cannot
    /// be read. Per-user failures are logged and counted instead.
    pub async fn recover(&self) -> Result<RecoveryOutcome> {
        let Some(_guard) = InProgress::acquire(&self.in_progress) else {
            warn!("Recovery already in progress, skipping");
            return Ok(RecoveryOutcome::AlreadyRunning);
        };

        info!(
            integration = self.integration_enabled(),
            "Starting state recovery"
        );

        let report = match self.run_pass().await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "State recovery failed");
                return Err(e);
            }
        };

        info!(
            users = report.users,
            reconciled = report.reconciled,
            reconnected = report.reconnected,
            skipped = report.skipped,
            failed = report.failed,
            "State recovery completed"
        );
        Ok(RecoveryOutcome::Completed(report))
    }

    async fn run_pass(&self) -> Result<RecoveryReport> {
        let mut report = RecoveryReport::default();

        let state = self.store.get_system_state().await?;
        if state.is_fresh() {
            info!("No previous system state, fresh start");
            report.fresh_start = true;
        } else {
            info!(
                last_trade_check = ?state.last_trade_check,
                last_analysis_run = ?state.last_analysis_run,
                version = state.version.as_deref().unwrap_or("unknown"),
                "Recovered system state"
            );
        }

        let users = self.store.list_active_users().await?;
        report.users = users.len();

        for user in &users {
            let outcome = match self.recover_user(user).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        user_id = %user.id,
                        chat_id = %user.chat_id,
                        error = %e,
                        "Failed to recover user session"
                    );
                    UserRecovery::Failed
                }
            };
            match outcome {
                UserRecovery::Reconciled => report.reconciled += 1,
                UserRecovery::Reconnected => report.reconnected += 1,
                UserRecovery::Skipped => report.skipped += 1,
                UserRecovery::Failed => report.failed += 1,
            }
        }

        Ok(report)
    }

    async fn recover_user(&self, user: &User) -> Result<UserRecovery> {
        let now = Utc::now();

        if let Some(session) = self.store.get_active_session(user.id).await? {
            if session.is_valid_at(now) {
                debug!(user_id = %user.id, session_id = %session.id, "Session still valid");
                return Ok(UserRecovery::Reconciled);
            }
            info!(
                user_id = %user.id,
                session_id = %session.id,
                expires_at = ?session.expires_at,
                "Session expired, deactivating"
            );
            self.store.deactivate_session(session.id).await?;
        }

        let Some(credentials) = &self.credentials else {
            debug!(user_id = %user.id, "Brokerage integration disabled, leaving user without session");
            return Ok(UserRecovery::Skipped);
        };

        if !self.client.login(credentials).await {
            warn!(user_id = %user.id, chat_id = %user.chat_id, "Reconnection failed");
            return Ok(UserRecovery::Failed);
        }

        let Some(broker_session) = self.client.session() else {
            warn!(user_id = %user.id, "Login reported success without a session");
            return Ok(UserRecovery::Failed);
        };

        let expires_at = Utc::now() + self.session_ttl;
        let created = self
            .store
            .create_session(NewSession::from_broker(
                user.id,
                &broker_session,
                Some(expires_at),
            ))
            .await?;
        info!(
            user_id = %user.id,
            session_id = %created.id,
            %expires_at,
            "Reconnected user session"
        );
        Ok(UserRecovery::Reconnected)
    }

    /// Persist a session for `user`, superseding any earlier one.
    pub async fn save_user_session(
        &self,
        user: &User,
        session: &BrokerSession,
        expires_at: DateTime<Utc>,
    ) -> bool {
        match self
            .store
            .create_session(NewSession::from_broker(user.id, session, Some(expires_at)))
            .await
        {
            Ok(created) => {
                info!(user_id = %user.id, session_id = %created.id, "Saved user session");
                true
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Failed to save user session");
                false
            }
        }
    }

    /// Deactivate the user's active session. A user without one counts as
    /// cleared.
    pub async fn clear_user_session(&self, user: &User) -> bool {
        let result = async {
            match self.store.get_active_session(user.id).await? {
                Some(session) => self.store.deactivate_session(session.id).await,
                None => Ok(true),
            }
        }
        .await;

        match result {
            Ok(cleared) => {
                debug!(user_id = %user.id, cleared, "Cleared user session");
                cleared
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Failed to clear user session");
                false
            }
        }
    }

    /// The user's active session, or `None` if absent or unreadable.
    pub async fn user_session(&self, user: &User) -> Option<Session> {
        match self.store.get_active_session(user.id).await {
            Ok(session) => session,
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Failed to load user session");
                None
            }
        }
    }

    /// Write system state fields. Returns `false` on store failure.
    pub async fn update_system_state(&self, update: SystemStateUpdate) -> bool {
        match self.store.update_system_state(update).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to update system state");
                false
            }
        }
    }
}

impl std::fmt::Debug for RecoveryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryManager")
            .field("integration", &self.integration_enabled())
            .field("session_ttl", &self.session_ttl)
            .field("recovering", &self.is_recovering())
            .finish()
    }
}

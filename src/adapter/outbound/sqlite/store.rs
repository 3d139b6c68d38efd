//! SQLite record store implementation.
//!
//! Durable storage for users, broker sessions, system state, sealed
//! credentials and relayed trades using SQLite and Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{
    date, flag, timestamp, CredentialRow, NewSessionRow, NewTradeRow, NewUserRow, SessionRow,
    SystemStateChangeset, SystemStateRow, UserChangeset, UserRow, SYSTEM_STATE_ID,
};
use crate::adapter::outbound::sqlite::database::schema::{
    encrypted_credentials, insider_trades, sessions, system_state, users,
};
use crate::domain::{
    ChatId, InsiderTrade, NewSession, NewUser, Session, SessionId, SystemState,
    SystemStateUpdate, TradeKey, User, UserId, UserUpdate,
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    CredentialStore, SessionStore, SystemStateStore, TradeStore, UserStore,
};

/// SQLite-backed record store.
///
/// Implements every record store port. Creating a session deactivates the
/// user's previous sessions inside the same immediate transaction, so at
/// most one session per user is ever active. Diesel calls are blocking and
/// run on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteRecordStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteRecordStore {
    /// Create a new SQLite record store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `query` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
            query(&mut *conn)
        })
        .await
        .map_err(|e| Error::Connection(format!("database task failed: {e}")))?
    }

    fn ensure_system_state(conn: &mut SqliteConnection) -> Result<()> {
        diesel::insert_or_ignore_into(system_state::table)
            .values(&SystemStateRow::fresh(Utc::now()))
            .execute(conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

#[async_trait]
impl UserStore for SqliteRecordStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = timestamp(Utc::now());
        let row = NewUserRow {
            chat_id: user.chat_id.get(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: flag(true),
            is_admin: flag(false),
            created_at: now.clone(),
            updated_at: now,
        };

        let created = self
            .with_conn(move |conn| {
                diesel::insert_into(users::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|e| Error::Database(e.to_string()))?;

                users::table
                    .filter(users::chat_id.eq(row.chat_id))
                    .select(UserRow::as_select())
                    .first(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        created.into_domain()
    }

    async fn get_user_by_chat_id(&self, chat_id: ChatId) -> Result<Option<User>> {
        let row: Option<UserRow> = self
            .with_conn(move |conn| {
                users::table
                    .filter(users::chat_id.eq(chat_id.get()))
                    .select(UserRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn update_user(&self, chat_id: ChatId, update: UserUpdate) -> Result<bool> {
        let changes = UserChangeset {
            username: update.username,
            first_name: update.first_name,
            last_name: update.last_name,
            is_active: update.is_active.map(flag),
            is_admin: update.is_admin.map(flag),
            updated_at: timestamp(Utc::now()),
        };

        let updated = self
            .with_conn(move |conn| {
                diesel::update(users::table.filter(users::chat_id.eq(chat_id.get())))
                    .set(&changes)
                    .execute(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        Ok(updated > 0)
    }

    async fn list_active_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = self
            .with_conn(|conn| {
                users::table
                    .filter(users::is_active.eq(flag(true)))
                    .order(users::id.asc())
                    .select(UserRow::as_select())
                    .load(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        rows.into_iter().map(UserRow::into_domain).collect()
    }
}

#[async_trait]
impl SessionStore for SqliteRecordStore {
    async fn create_session(&self, session: NewSession) -> Result<Session> {
        let user_id = session.user_id.get();
        let row = NewSessionRow {
            user_id,
            session_token: session.session_token,
            session_key: session.session_key,
            client_id: session.client_id,
            created_at: timestamp(Utc::now()),
            expires_at: session.expires_at.map(timestamp),
            is_active: flag(true),
        };

        let created = self
            .with_conn(move |conn| {
                conn.immediate_transaction::<SessionRow, Error, _>(|conn| {
                    diesel::update(
                        sessions::table
                            .filter(sessions::user_id.eq(user_id))
                            .filter(sessions::is_active.eq(flag(true))),
                    )
                    .set(sessions::is_active.eq(flag(false)))
                    .execute(conn)?;

                    diesel::insert_into(sessions::table)
                        .values(&row)
                        .execute(conn)?;

                    let created = sessions::table
                        .filter(sessions::user_id.eq(user_id))
                        .order(sessions::id.desc())
                        .select(SessionRow::as_select())
                        .first(conn)?;
                    Ok(created)
                })
            })
            .await?;

        created.into_domain()
    }

    async fn get_active_session(&self, user_id: UserId) -> Result<Option<Session>> {
        let row: Option<SessionRow> = self
            .with_conn(move |conn| {
                sessions::table
                    .filter(sessions::user_id.eq(user_id.get()))
                    .filter(sessions::is_active.eq(flag(true)))
                    .order(sessions::id.desc())
                    .select(SessionRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        row.map(SessionRow::into_domain).transpose()
    }

    async fn deactivate_session(&self, session_id: SessionId) -> Result<bool> {
        let updated = self
            .with_conn(move |conn| {
                diesel::update(sessions::table.find(session_id.get()))
                    .set(sessions::is_active.eq(flag(false)))
                    .execute(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        Ok(updated > 0)
    }
}

#[async_trait]
impl SystemStateStore for SqliteRecordStore {
    async fn get_system_state(&self) -> Result<SystemState> {
        let row: SystemStateRow = self
            .with_conn(|conn| {
                Self::ensure_system_state(conn)?;
                system_state::table
                    .find(SYSTEM_STATE_ID)
                    .select(SystemStateRow::as_select())
                    .first(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        row.into_domain()
    }

    async fn update_system_state(&self, update: SystemStateUpdate) -> Result<()> {
        let changes = SystemStateChangeset {
            last_trade_check: update.last_trade_check.map(timestamp),
            last_analysis_run: update.last_analysis_run.map(timestamp),
            version: update.version,
            updated_at: timestamp(Utc::now()),
        };

        self.with_conn(move |conn| {
            Self::ensure_system_state(conn)?;
            diesel::update(system_state::table.find(SYSTEM_STATE_ID))
                .set(&changes)
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CredentialStore for SqliteRecordStore {
    async fn save_credentials(&self, user_id: UserId, platform: &str, sealed: &str) -> Result<()> {
        let row = CredentialRow {
            user_id: user_id.get(),
            platform: platform.to_string(),
            encrypted_data: sealed.to_string(),
            updated_at: timestamp(Utc::now()),
        };

        self.with_conn(move |conn| {
            diesel::replace_into(encrypted_credentials::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn get_credentials(&self, user_id: UserId, platform: &str) -> Result<Option<String>> {
        let platform = platform.to_string();

        self.with_conn(move |conn| {
            encrypted_credentials::table
                .find((user_id.get(), platform))
                .select(encrypted_credentials::encrypted_data)
                .first(conn)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))
        })
        .await
    }
}

#[async_trait]
impl TradeStore for SqliteRecordStore {
    async fn trade_exists(&self, key: &TradeKey) -> Result<bool> {
        let company = key.company_name().to_string();
        let insider = key.insider_name().to_string();
        let day = date(key.transaction_date());

        self.with_conn(move |conn| {
            diesel::select(diesel::dsl::exists(
                insider_trades::table
                    .filter(insider_trades::company_name.eq(company))
                    .filter(insider_trades::insider_name.eq(insider))
                    .filter(insider_trades::transaction_date.eq(day)),
            ))
            .get_result(conn)
            .map_err(|e| Error::Database(e.to_string()))
        })
        .await
    }

    async fn save_trade(&self, trade: &InsiderTrade) -> Result<bool> {
        let row = NewTradeRow::from_domain(trade, Utc::now());

        // The unique (company, insider, date) index turns a repeat into a no-op.
        let inserted = self
            .with_conn(move |conn| {
                diesel::insert_or_ignore_into(insider_trades::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|e| Error::Database(e.to_string()))
            })
            .await?;

        Ok(inserted > 0)
    }
}

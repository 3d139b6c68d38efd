//! Database model types for Diesel ORM.
//!
//! Timestamps are stored as RFC 3339 text, dates as `YYYY-MM-DD`, decimals
//! as their string form and flags as `0`/`1` integers.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{encrypted_credentials, insider_trades, sessions, system_state, users};
use crate::domain::{ChatId, InsiderTrade, Session, SessionId, SystemState, User, UserId};
use crate::error::{Error, Result};

/// Primary key of the system-state singleton row.
pub const SYSTEM_STATE_ID: i32 = 1;

pub(crate) fn flag(value: bool) -> i32 {
    i32::from(value)
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("invalid timestamp {raw:?}: {e}")))
}

pub(crate) fn date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn parse_optional(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(parse_timestamp).transpose()
}

/// Database row for a user (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: i32,
    pub is_admin: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_domain(self) -> Result<User> {
        Ok(User {
            id: UserId::new(self.id),
            chat_id: ChatId::new(self.chat_id),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active != 0,
            is_admin: self.is_admin != 0,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Database row for a user (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: i32,
    pub is_admin: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial user update; `None` columns are left untouched.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<i32>,
    pub is_admin: Option<i32>,
    pub updated_at: String,
}

/// Database row for a session (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRow {
    pub id: i32,
    pub user_id: i32,
    pub session_token: String,
    pub session_key: String,
    pub client_id: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub is_active: i32,
}

impl SessionRow {
    pub fn into_domain(self) -> Result<Session> {
        Ok(Session {
            id: SessionId::new(self.id),
            user_id: UserId::new(self.user_id),
            session_token: self.session_token,
            session_key: self.session_key,
            client_id: self.client_id,
            created_at: parse_timestamp(&self.created_at)?,
            expires_at: parse_optional(self.expires_at.as_deref())?,
            is_active: self.is_active != 0,
        })
    }
}

/// Database row for a session (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = sessions)]
pub struct NewSessionRow {
    pub user_id: i32,
    pub session_token: String,
    pub session_key: String,
    pub client_id: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub is_active: i32,
}

/// Database row for the system-state singleton.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = system_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SystemStateRow {
    pub id: i32,
    pub last_trade_check: Option<String>,
    pub last_analysis_run: Option<String>,
    pub version: Option<String>,
    pub updated_at: String,
}

impl SystemStateRow {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            id: SYSTEM_STATE_ID,
            last_trade_check: None,
            last_analysis_run: None,
            version: None,
            updated_at: timestamp(now),
        }
    }

    pub fn into_domain(self) -> Result<SystemState> {
        Ok(SystemState {
            last_trade_check: parse_optional(self.last_trade_check.as_deref())?,
            last_analysis_run: parse_optional(self.last_analysis_run.as_deref())?,
            version: self.version,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Partial system-state update.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = system_state)]
pub struct SystemStateChangeset {
    pub last_trade_check: Option<String>,
    pub last_analysis_run: Option<String>,
    pub version: Option<String>,
    pub updated_at: String,
}

/// Database row for sealed credentials.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = encrypted_credentials)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CredentialRow {
    pub user_id: i32,
    pub platform: String,
    pub encrypted_data: String,
    pub updated_at: String,
}

/// Database row for a relayed insider trade (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = insider_trades)]
pub struct NewTradeRow {
    pub company_name: String,
    pub insider_name: String,
    pub relationship: String,
    pub transaction_date: String,
    pub side: String,
    pub price: String,
    pub quantity: String,
    pub total_value: String,
    pub created_at: String,
}

impl NewTradeRow {
    pub fn from_domain(trade: &InsiderTrade, now: DateTime<Utc>) -> Self {
        Self {
            company_name: trade.company_name.clone(),
            insider_name: trade.insider_name.clone(),
            relationship: trade.relationship.clone(),
            transaction_date: date(trade.transaction_date),
            side: trade.side.as_str().to_string(),
            price: trade.price.to_string(),
            quantity: trade.quantity.to_string(),
            total_value: trade.total_value.to_string(),
            created_at: timestamp(now),
        }
    }
}

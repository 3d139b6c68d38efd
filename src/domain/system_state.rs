//! Global system metadata singleton.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single system-state record.
///
/// Created lazily with empty timestamps the first time it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    pub last_trade_check: Option<DateTime<Utc>>,
    pub last_analysis_run: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SystemState {
    /// A fresh record with no history.
    #[must_use]
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_trade_check: None,
            last_analysis_run: None,
            version: None,
            updated_at: now,
        }
    }

    /// True if nothing has ever run against this state.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.last_trade_check.is_none() && self.last_analysis_run.is_none()
    }
}

/// Partial update of the system state; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemStateUpdate {
    pub last_trade_check: Option<DateTime<Utc>>,
    pub last_analysis_run: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

impl SystemStateUpdate {
    #[must_use]
    pub fn trade_check(at: DateTime<Utc>) -> Self {
        Self {
            last_trade_check: Some(at),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn analysis_run(at: DateTime<Utc>) -> Self {
        Self {
            last_analysis_run: Some(at),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn version(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn apply(&self, state: &mut SystemState, now: DateTime<Utc>) {
        if let Some(at) = self.last_trade_check {
            state.last_trade_check = Some(at);
        }
        if let Some(at) = self.last_analysis_run {
            state.last_analysis_run = Some(at);
        }
        if let Some(version) = &self.version {
            state.version = Some(version.clone());
        }
        state.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_timestamps() {
        let state = SystemState::fresh(Utc::now());
        assert!(state.is_fresh());
        assert!(state.version.is_none());
    }

    #[test]
    fn update_sets_only_given_fields() {
        let now = Utc::now();
        let mut state = SystemState::fresh(now);
        state.version = Some("0.1.0".into());

        SystemStateUpdate::trade_check(now).apply(&mut state, now);

        assert_eq!(state.last_trade_check, Some(now));
        assert!(state.last_analysis_run.is_none());
        assert_eq!(state.version.as_deref(), Some("0.1.0"));
        assert!(!state.is_fresh());
    }
}

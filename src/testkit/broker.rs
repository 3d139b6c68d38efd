//! Scripted [`BrokerageBackend`] for testing retry and recovery paths.
//!
//! Each operation pops the next [`Step`] from its own queue. When a queue is
//! empty the broker falls back to its default step (succeed for
//! [`ScriptedBroker::accepting`], decline for [`ScriptedBroker::rejecting`]).
//! Every call is counted, and login attempts are timestamped with tokio's
//! clock so paused-time tests can assert the backoff schedule.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::time::Instant;

use crate::domain::{
    AccountInfo, BrokerCredentials, BrokerSession, Funds, OrderConfirmation, OrderRequest,
    Position,
};
use crate::error::BrokerError;
use crate::port::outbound::brokerage::{BrokerResult, BrokerageBackend};

/// Scripted behaviour for one backend call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Return a value.
    Succeed,
    /// Return an operation-level failure (`Ok(None)`).
    Decline,
    /// Raise a fault.
    Fault(BrokerError),
    /// Sleep, then succeed.
    Hang(Duration),
}

#[derive(Default)]
struct Scripts {
    login: VecDeque<Step>,
    portfolio: VecDeque<Step>,
    funds: VecDeque<Step>,
    order: VecDeque<Step>,
}

/// Brokerage backend driven by per-operation scripts.
pub struct ScriptedBroker {
    fallback: Step,
    client_id: String,
    scripts: Mutex<Scripts>,
    login_count: Arc<AtomicU32>,
    portfolio_count: Arc<AtomicU32>,
    funds_count: Arc<AtomicU32>,
    order_count: Arc<AtomicU32>,
    login_times: Mutex<Vec<Instant>>,
}

impl ScriptedBroker {
    fn with_fallback(fallback: Step) -> Self {
        Self {
            fallback,
            client_id: "client-42".to_string(),
            scripts: Mutex::new(Scripts::default()),
            login_count: Arc::new(AtomicU32::new(0)),
            portfolio_count: Arc::new(AtomicU32::new(0)),
            funds_count: Arc::new(AtomicU32::new(0)),
            order_count: Arc::new(AtomicU32::new(0)),
            login_times: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds whenever no script step is queued.
    pub fn accepting() -> Self {
        Self::with_fallback(Step::Succeed)
    }

    /// Declines whenever no script step is queued.
    pub fn rejecting() -> Self {
        Self::with_fallback(Step::Decline)
    }

    pub fn with_login_script(self, steps: Vec<Step>) -> Self {
        self.scripts.lock().login = steps.into();
        self
    }

    pub fn with_portfolio_script(self, steps: Vec<Step>) -> Self {
        self.scripts.lock().portfolio = steps.into();
        self
    }

    pub fn with_funds_script(self, steps: Vec<Step>) -> Self {
        self.scripts.lock().funds = steps.into();
        self
    }

    pub fn with_order_script(self, steps: Vec<Step>) -> Self {
        self.scripts.lock().order = steps.into();
        self
    }

    /// Queue more login steps on a broker that is already shared.
    pub fn push_login_steps(&self, steps: impl IntoIterator<Item = Step>) {
        self.scripts.lock().login.extend(steps);
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn login_calls(&self) -> u32 {
        self.login_count.load(Ordering::SeqCst)
    }

    pub fn portfolio_calls(&self) -> u32 {
        self.portfolio_count.load(Ordering::SeqCst)
    }

    pub fn funds_calls(&self) -> u32 {
        self.funds_count.load(Ordering::SeqCst)
    }

    pub fn order_calls(&self) -> u32 {
        self.order_count.load(Ordering::SeqCst)
    }

    /// Clock readings taken at the start of each login attempt.
    pub fn login_attempt_times(&self) -> Vec<Instant> {
        self.login_times.lock().clone()
    }

    fn next_step(&self, pick: impl FnOnce(&mut Scripts) -> &mut VecDeque<Step>) -> Step {
        let mut scripts = self.scripts.lock();
        pick(&mut *scripts)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn play<T>(step: Step, value: impl FnOnce() -> T) -> BrokerResult<T> {
        match step {
            Step::Succeed => Ok(Some(value())),
            Step::Decline => Ok(None),
            Step::Fault(err) => Err(err),
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(Some(value()))
            }
        }
    }
}

#[async_trait]
impl BrokerageBackend for ScriptedBroker {
    async fn login(
        &self,
        credentials: &BrokerCredentials,
    ) -> BrokerResult<(BrokerSession, AccountInfo)> {
        let attempt = self.login_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.login_times.lock().push(Instant::now());

        let mut step = self.next_step(|s| &mut s.login);
        if !credentials.is_complete() && matches!(step, Step::Succeed) {
            step = Step::Decline;
        }

        let client_id = self.client_id.clone();
        let username = credentials.username.clone();
        Self::play(step, move || {
            (
                BrokerSession {
                    session_token: format!("token-{attempt}"),
                    session_key: format!("key-{attempt}"),
                    client_id: client_id.clone(),
                },
                AccountInfo {
                    client_id,
                    username,
                    currency: "EUR".to_string(),
                },
            )
        })
        .await
    }

    async fn portfolio(&self) -> BrokerResult<Vec<Position>> {
        self.portfolio_count.fetch_add(1, Ordering::SeqCst);
        let step = self.next_step(|s| &mut s.portfolio);
        Self::play(step, || {
            vec![Position {
                product_id: "331868".to_string(),
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                quantity: Decimal::from(10),
                price: Decimal::new(15025, 2),
                total_value: Decimal::new(150250, 2),
            }]
        })
        .await
    }

    async fn funds(&self) -> BrokerResult<Funds> {
        self.funds_count.fetch_add(1, Ordering::SeqCst);
        let step = self.next_step(|s| &mut s.funds);
        Self::play(step, || Funds {
            currency: "EUR".to_string(),
            available: Decimal::from(5000),
            total: Decimal::from(20000),
        })
        .await
    }

    async fn place_order(&self, _order: &OrderRequest) -> BrokerResult<OrderConfirmation> {
        let n = self.order_count.fetch_add(1, Ordering::SeqCst) + 1;
        let step = self.next_step(|s| &mut s.order);
        Self::play(step, || OrderConfirmation::new(format!("scripted-order-{n}"))).await
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

//! Domain types: users, brokerage sessions, system state and the brokerage
//! payloads exchanged with the backend.

pub mod brokerage;
pub mod error;
pub mod id;
pub mod session;
pub mod system_state;
pub mod trade;
pub mod user;

pub use brokerage::{
    AccountInfo, BrokerCredentials, BrokerSession, Funds, OrderConfirmation, OrderRequest,
    OrderSide, Position,
};
pub use id::{ChatId, SessionId, UserId};
pub use session::{NewSession, Session};
pub use system_state::{SystemState, SystemStateUpdate};
pub use trade::{InsiderTrade, TradeKey};
pub use user::{NewUser, User, UserUpdate};

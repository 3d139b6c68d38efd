//! Infrastructure configuration modules.

pub mod logging;
pub mod settings;

pub use logging::{LogFormat, LoggingConfig};
pub use settings::{BrokerageConfig, Config, FileConfig, SchedulerConfig, Secret};

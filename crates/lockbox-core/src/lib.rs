pub mod config;
pub mod constants;
pub mod error;
pub mod state;
pub mod types;

pub use config::{ActuatorConfig, LockerConfig, SensorConfig, TimingConfig};
pub use error::{Error, Result};
pub use state::{AccessState, OperationKind, SessionSnapshot};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "strategy")]
pub mod strategy;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "export")]
pub mod export;

pub use config::{InterestAccrual, SimulationConfig};
pub use error::PayoffError;
pub use types::*;

/// Standard result type for all payoff operations
pub type PayoffResult<T> = Result<T, PayoffError>;

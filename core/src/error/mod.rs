#[allow(clippy::module_inception)]
pub mod error;
pub mod plan;

pub use error::{ErrorCode, GeniusError};
pub use plan::PlanParseError;

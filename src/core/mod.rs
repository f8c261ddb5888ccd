/*!
 * Core Module
 * Shared primitive types and platform limits
 */

pub mod limits;
pub mod types;

// Re-export for convenience
pub use types::{Pid, QualityOfService};

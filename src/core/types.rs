/*!
 * Core Types
 * Common types shared across the task subsystem
 */

use serde::{Deserialize, Serialize};

/// Process ID type
pub type Pid = u32;

/// Scheduling hint applied to a launched child, best-effort.
///
/// Maps onto the POSIX nice scale; `Default` applies no adjustment.
/// Raising priority (the two interactive levels) usually requires
/// privileges the caller does not have, in which case the hint is
/// logged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityOfService {
    /// Work the user is actively waiting on
    UserInteractive,
    /// Work the user asked for and expects soon
    UserInitiated,
    /// No scheduling adjustment
    Default,
    /// Work the user is not waiting on
    Utility,
    /// Maintenance work, lowest priority
    Background,
}

impl QualityOfService {
    /// Nice value applied to the child after spawn
    pub fn nice_value(&self) -> i32 {
        match self {
            QualityOfService::UserInteractive => -10,
            QualityOfService::UserInitiated => -5,
            QualityOfService::Default => 0,
            QualityOfService::Utility => 5,
            QualityOfService::Background => 10,
        }
    }
}

impl Default for QualityOfService {
    fn default() -> Self {
        QualityOfService::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_value_ordering() {
        // Higher service classes map to lower (more favorable) nice values
        assert!(
            QualityOfService::UserInteractive.nice_value()
                < QualityOfService::UserInitiated.nice_value()
        );
        assert!(
            QualityOfService::UserInitiated.nice_value() < QualityOfService::Default.nice_value()
        );
        assert!(QualityOfService::Default.nice_value() < QualityOfService::Utility.nice_value());
        assert!(QualityOfService::Utility.nice_value() < QualityOfService::Background.nice_value());
    }

    #[test]
    fn test_default_is_neutral() {
        assert_eq!(QualityOfService::default(), QualityOfService::Default);
        assert_eq!(QualityOfService::default().nice_value(), 0);
    }
}

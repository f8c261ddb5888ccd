/*!
 * Task Configuration
 * Pre-launch settings for a child process
 */

use crate::core::types::QualityOfService;
use crate::io::channel::TaskChannel;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Configuration for a child process, captured before launch.
///
/// The environment and working directory are snapshotted from the
/// calling process when the configuration is created; later changes to
/// the caller's globals never leak into the child.
#[derive(Debug)]
pub struct TaskConfig {
    /// Path to the executable; relative paths resolve against
    /// `working_directory`, where the child's exec will resolve them
    pub launch_path: Option<String>,
    pub arguments: Vec<String>,
    pub environment: HashMap<String, String>,
    pub working_directory: PathBuf,
    pub quality_of_service: QualityOfService,
    pub standard_input: TaskChannel,
    pub standard_output: TaskChannel,
    pub standard_error: TaskChannel,
}

impl TaskConfig {
    /// Create a configuration seeded with a snapshot of the calling
    /// process's environment and current directory.
    pub fn new() -> Self {
        Self {
            launch_path: None,
            arguments: Vec::new(),
            environment: env::vars().collect(),
            working_directory: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            quality_of_service: QualityOfService::default(),
            standard_input: TaskChannel::Inherit,
            standard_output: TaskChannel::Inherit,
            standard_error: TaskChannel::Inherit,
        }
    }

    pub fn with_launch_path(mut self, path: impl Into<String>) -> Self {
        self.launch_path = Some(path.into());
        self
    }

    pub fn with_arguments(mut self, args: Vec<String>) -> Self {
        self.arguments = args;
        self
    }

    pub fn with_environment(mut self, env: HashMap<String, String>) -> Self {
        self.environment = env;
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = dir.into();
        self
    }

    pub fn with_quality_of_service(mut self, qos: QualityOfService) -> Self {
        self.quality_of_service = qos;
        self
    }

    pub fn with_standard_input(mut self, channel: TaskChannel) -> Self {
        self.standard_input = channel;
        self
    }

    pub fn with_standard_output(mut self, channel: TaskChannel) -> Self {
        self.standard_output = channel;
        self
    }

    pub fn with_standard_error(mut self, channel: TaskChannel) -> Self {
        self.standard_error = channel;
        self
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::channel::ChannelKind;

    #[test]
    fn test_snapshot_captures_caller_state() {
        let config = TaskConfig::new();

        // The snapshot mirrors the environment and directory at creation
        assert_eq!(config.working_directory, env::current_dir().unwrap());
        assert!(!config.environment.is_empty());
        assert_eq!(
            config.environment.get("PATH").cloned(),
            env::var("PATH").ok()
        );
    }

    #[test]
    fn test_snapshot_is_insulated_from_later_changes() {
        let config = TaskConfig::new();
        let key = "TASKLING_SNAPSHOT_PROBE";

        env::set_var(key, "after");
        assert!(config.environment.get(key).is_none());
        env::remove_var(key);
    }

    #[test]
    fn test_builders_set_fields() {
        let config = TaskConfig::new()
            .with_launch_path("/bin/echo")
            .with_arguments(vec!["hello".to_string()])
            .with_working_directory("/tmp")
            .with_quality_of_service(QualityOfService::Background)
            .with_standard_output(TaskChannel::Pipe);

        assert_eq!(config.launch_path.as_deref(), Some("/bin/echo"));
        assert_eq!(config.arguments, vec!["hello".to_string()]);
        assert_eq!(config.working_directory, PathBuf::from("/tmp"));
        assert_eq!(config.quality_of_service, QualityOfService::Background);
        assert_eq!(config.standard_output.kind(), ChannelKind::Pipe);
        assert_eq!(config.standard_input.kind(), ChannelKind::Inherit);
    }
}

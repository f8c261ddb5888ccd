/*!
 * Conveniences
 * Thin helpers layered strictly on the public task contract
 */

use crate::io::channel::TaskChannel;
use crate::task::config::TaskConfig;
use crate::task::task::Task;
use crate::task::types::TaskResult;
use log::{error, warn};
use std::path::Path;
use std::thread;

/// Assemble a configured task from a command, arguments, and an
/// optional working directory. Nothing is launched.
pub fn task_with_command(command: &str, arguments: &[&str], directory: Option<&Path>) -> Task {
    let mut config = TaskConfig::new()
        .with_launch_path(command)
        .with_arguments(arguments.iter().map(|s| s.to_string()).collect());
    if let Some(dir) = directory {
        config = config.with_working_directory(dir);
    }
    Task::from_config(config)
}

/// Create a task for the given executable and launch it immediately
pub fn launched_task(path: &str, arguments: &[&str]) -> TaskResult<Task> {
    let task = Task::from_config(
        TaskConfig::new()
            .with_launch_path(path)
            .with_arguments(arguments.iter().map(|s| s.to_string()).collect()),
    );
    task.launch()?;
    Ok(task)
}

/// Build a task, register a termination handler, and launch it.
/// All errors from the core are forwarded unchanged.
pub fn execute<F>(
    command: &str,
    arguments: &[&str],
    directory: Option<&Path>,
    handler: F,
) -> TaskResult<Task>
where
    F: FnOnce(Task) + Send + 'static,
{
    let task = task_with_command(command, arguments, directory);
    task.set_termination_handler(handler)?;
    task.launch()?;
    Ok(task)
}

/// Run a command with its standard output collected into memory.
///
/// The output pipe is drained on a helper thread while the child runs,
/// so children writing more than a pipe buffer never stall. The
/// completion receives the terminated task and everything it wrote.
pub fn execute_collecting<F>(
    command: &str,
    arguments: &[&str],
    directory: Option<&Path>,
    completion: F,
) -> TaskResult<Task>
where
    F: FnOnce(Task, Vec<u8>) + Send + 'static,
{
    let task = task_with_command(command, arguments, directory);
    task.set_standard_output(TaskChannel::Pipe)?;
    task.launch()?;

    let reader = task.take_stdout();
    let worker = task.clone();
    let builder = thread::Builder::new().name("task-collect".to_string());
    let spawned = builder.spawn(move || {
        let mut output = Vec::new();
        if let Some(mut reader) = reader {
            match reader.drain() {
                Ok(data) => output = data,
                Err(e) => warn!("Failed to drain child stdout: {}", e),
            }
        }
        worker.wait_until_exit();
        completion(worker, output);
    });
    if let Err(e) = spawned {
        error!("Failed to start collection thread: {}", e);
    }

    Ok(task)
}

/*!
 * Convenience Layer Tests
 * The helpers stay thin wrappers over the core contract
 */

use pretty_assertions::assert_eq;
use std::sync::mpsc;
use std::time::Duration;
use taskling::{execute, execute_collecting, launched_task, task_with_command, TaskError};

#[test]
fn test_task_with_command_is_not_launched() {
    let task = task_with_command("/bin/echo", &["assembled"], None);

    assert!(!task.is_running());
    assert_eq!(task.process_identifier(), None);
    assert_eq!(task.launch_path().as_deref(), Some("/bin/echo"));

    task.launch().unwrap();
    task.wait_until_exit();
    assert_eq!(task.termination_status(), Some(0));
}

#[test]
fn test_launched_task_runs() {
    let task = launched_task("/bin/true", &[]).unwrap();
    task.wait_until_exit();
    assert_eq!(task.termination_status(), Some(0));
}

#[test]
fn test_launched_task_forwards_core_errors() {
    let err = launched_task("/no/such/binary", &[]).unwrap_err();
    assert!(matches!(err, TaskError::InvalidLaunchPath { .. }));
}

#[test]
fn test_execute_fires_handler() {
    let (tx, rx) = mpsc::channel();

    execute("/bin/true", &[], None, move |terminated| {
        tx.send(terminated.termination_status()).unwrap();
    })
    .unwrap();

    let status = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(status, Some(0));
}

#[test]
fn test_execute_collecting_gathers_stdout() {
    let (tx, rx) = mpsc::channel();

    execute_collecting("/bin/echo", &["collected"], None, move |task, output| {
        tx.send((task.termination_status(), output)).unwrap();
    })
    .unwrap();

    let (status, output) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(status, Some(0));
    assert_eq!(String::from_utf8(output).unwrap(), "collected\n");
}

#[test]
fn test_execute_collecting_handles_large_output() {
    // More than a pipe buffer; the drain thread keeps the child moving
    let (tx, rx) = mpsc::channel();

    execute_collecting(
        "/bin/sh",
        &["-c", "head -c 1048576 /dev/zero"],
        None,
        move |task, output| {
            tx.send((task.termination_status(), output.len())).unwrap();
        },
    )
    .unwrap();

    let (status, len) = rx.recv_timeout(Duration::from_secs(20)).unwrap();
    assert_eq!(status, Some(0));
    assert_eq!(len, 1048576);
}

#[test]
fn test_execute_runs_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    let resolved = dir.path().canonicalize().unwrap();
    let (tx, rx) = mpsc::channel();

    let expected = resolved.clone();
    execute_collecting(
        "/bin/pwd",
        &[],
        Some(resolved.as_path()),
        move |_, output| {
            tx.send(String::from_utf8(output).unwrap()).unwrap();
        },
    )
    .unwrap();

    let reported = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(reported.trim_end(), expected.to_string_lossy());
}

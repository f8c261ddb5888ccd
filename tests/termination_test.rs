/*!
 * Termination Observation Tests
 * Callback delivery, blocking waits, and status classification
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use taskling::{Task, TaskPhase, Termination, TerminationReason};

#[test]
fn test_exit_code_classification() {
    let task = Task::new();
    task.set_launch_path("/bin/sh").unwrap();
    task.set_arguments(vec!["-c".to_string(), "exit 3".to_string()])
        .unwrap();

    task.launch().unwrap();
    task.wait_until_exit();

    assert_eq!(task.phase(), TaskPhase::Terminated);
    assert_eq!(task.termination_status(), Some(3));
    assert_eq!(task.termination_reason(), Some(TerminationReason::Exited));
}

#[test]
fn test_callback_fires_exactly_once_after_transition() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_handler = Arc::clone(&calls);
    let (tx, rx) = mpsc::channel();

    let task = Task::new();
    task.set_launch_path("/bin/true").unwrap();
    task.set_termination_handler(move |terminated| {
        calls_in_handler.fetch_add(1, Ordering::SeqCst);
        // The handler runs after the terminated state is visible
        tx.send((
            terminated.is_running(),
            terminated.termination(),
        ))
        .unwrap();
    })
    .unwrap();

    task.launch().unwrap();

    let (running, termination) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(!running);
    assert_eq!(
        termination,
        Some(Termination {
            status: 0,
            reason: TerminationReason::Exited,
        })
    );

    task.wait_until_exit();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_callback_on_signaled_child() {
    let (tx, rx) = mpsc::channel();

    let task = Task::new();
    task.set_launch_path("/bin/sleep").unwrap();
    task.set_arguments(vec!["30".to_string()]).unwrap();
    task.set_termination_handler(move |terminated| {
        tx.send(terminated.termination()).unwrap();
    })
    .unwrap();

    task.launch().unwrap();
    assert!(task.terminate());

    let termination = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(
        termination,
        Some(Termination {
            status: libc::SIGTERM,
            reason: TerminationReason::Signaled,
        })
    );
}

#[test]
fn test_handler_registration_locked_after_launch() {
    let task = Task::new();
    task.set_launch_path("/bin/true").unwrap();
    task.launch().unwrap();

    assert!(task.set_termination_handler(|_| {}).is_err());
    task.wait_until_exit();
}

#[test]
fn test_concurrent_waiters_see_one_termination() {
    let task = Task::new();
    task.set_launch_path("/bin/sleep").unwrap();
    task.set_arguments(vec!["0.2".to_string()]).unwrap();
    task.launch().unwrap();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let waiter = task.clone();
            thread::spawn(move || {
                waiter.wait_until_exit();
                (waiter.is_running(), waiter.termination())
            })
        })
        .collect();

    let observations: Vec<_> = waiters
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let expected = Some(Termination {
        status: 0,
        reason: TerminationReason::Exited,
    });
    for (running, termination) in observations {
        assert!(!running);
        assert_eq!(termination, expected);
    }
}

#[test]
fn test_wait_after_termination_returns_immediately() {
    let task = Task::new();
    task.set_launch_path("/bin/true").unwrap();
    task.launch().unwrap();
    task.wait_until_exit();

    // Already terminated; a second wait must not block
    task.wait_until_exit();
    assert_eq!(task.termination_status(), Some(0));
}

extern "C" fn noop_signal_handler(_: libc::c_int) {}

#[test]
fn test_monitor_survives_interrupted_waits() {
    // A handler without SA_RESTART makes blocking waits return EINTR;
    // the monitor must retry instead of misrecording a live child as
    // terminated.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = noop_signal_handler as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGUSR1, &action, std::ptr::null_mut());
    }

    let task = Task::new();
    task.set_launch_path("/bin/sleep").unwrap();
    task.set_arguments(vec!["0.5".to_string()]).unwrap();
    task.launch().unwrap();

    let own_pid = unsafe { libc::getpid() };
    for _ in 0..60 {
        unsafe { libc::kill(own_pid, libc::SIGUSR1) };
        // The child must still look alive while the signals land
        if task.termination().is_some() {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    task.wait_until_exit();
    assert_eq!(task.termination_status(), Some(0));
    assert_eq!(task.termination_reason(), Some(TerminationReason::Exited));
}

#[test]
fn test_suspend_count_cleared_at_termination() {
    let task = Task::new();
    task.set_launch_path("/bin/sleep").unwrap();
    task.set_arguments(vec!["30".to_string()]).unwrap();
    task.launch().unwrap();

    assert!(task.suspend());
    assert_eq!(task.suspend_count(), 1);

    // SIGKILL is not blockable even while stopped
    let pid = task.process_identifier().unwrap();
    unsafe { libc::kill(pid as i32, libc::SIGKILL) };
    task.wait_until_exit();

    assert_eq!(task.suspend_count(), 0);
    assert_eq!(task.termination_reason(), Some(TerminationReason::Signaled));
    assert_eq!(task.termination_status(), Some(libc::SIGKILL));
}

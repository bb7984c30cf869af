use std::time::{Duration, Instant};

use codexec::{ErrorKind, ExecutionRequest, Limits};

use super::{fixture_source, leftovers, test_runner};

#[tokio::test]
async fn test_python_infinite_loop_times_out() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("python", fixture_source("infinite_loop.py"));
    let limits = Limits::unset().with_timeout(1.0);

    let started = Instant::now();
    let outcome = runner.execute_with_limits(&request, Some(&limits)).await;

    assert_eq!(outcome.error_kind, ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_c_infinite_loop_times_out_with_default_limit() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("c", fixture_source("infinite_loop.c"));

    let started = Instant::now();
    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::Timeout);
    assert_eq!(outcome.output_text, "execution timed out after 5.0s");
    // Compilation plus the 5s limit, with some slack
    assert!(started.elapsed() < Duration::from_secs(15));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_timeout_leaves_no_orphans() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("python", fixture_source("spawns_child.py"));
    let limits = Limits::unset().with_timeout(1.0);

    let outcome = runner.execute_with_limits(&request, Some(&limits)).await;
    assert_eq!(outcome.error_kind, ErrorKind::Timeout);

    // A surviving grandchild would drop a marker file next to the source
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(leftovers(dir.path()).is_empty());
}

use codexec::{ErrorKind, ExecutionRequest};

use super::{fixture_source, leftovers, test_runner};

#[tokio::test]
async fn test_hello_world_in_every_language() {
    let (runner, dir) = test_runner();

    for (language, fixture) in [
        ("python", "hello.py"),
        ("c", "hello.c"),
        ("cpp", "hello.cpp"),
    ] {
        let request = ExecutionRequest::new(language, fixture_source(fixture));
        let outcome = runner.execute(&request).await;

        assert_eq!(outcome.error_kind, ErrorKind::None, "{language}: {outcome:?}");
        assert_eq!(outcome.output_text, "Hello, World!\n");
    }

    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_python_runtime_error_returns_stderr() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("python", fixture_source("runtime_error.py"));

    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::RuntimeError);
    assert_eq!(outcome.output_text, "something went wrong\n");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_c_runtime_error_returns_stderr() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("c", fixture_source("runtime_error.c"));

    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::RuntimeError);
    assert_eq!(outcome.output_text, "fatal: bad input\n");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_python_traceback_is_surfaced() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("python", "1 / 0\n");

    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::RuntimeError);
    assert!(outcome.output_text.contains("ZeroDivisionError"));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_empty_source_creates_nothing() {
    let (runner, dir) = test_runner();

    let outcome = runner.execute(&ExecutionRequest::new("cpp", "")).await;

    assert_eq!(outcome.error_kind, ErrorKind::EmptyInput);
    assert_eq!(outcome.response_text(), "No code provided.");
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_unsupported_language() {
    let (runner, dir) = test_runner();

    let outcome = runner
        .execute(&ExecutionRequest::new("javascript", "console.log(1)"))
        .await;

    assert_eq!(outcome.error_kind, ErrorKind::UnsupportedLanguage);
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_missing_toolchain_is_system_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = codexec::Config {
        temp_dir: Some(dir.path().to_path_buf()),
        ..codexec::Config::default()
    };
    config.languages.c.compile = Some(vec![
        "codexec-no-such-compiler".to_owned(),
        "{source}".to_owned(),
        "-o".to_owned(),
        "{output}".to_owned(),
    ]);
    let runner = codexec::Runner::new(config);

    let outcome = runner
        .execute(&ExecutionRequest::new("c", fixture_source("hello.c")))
        .await;

    assert_eq!(outcome.error_kind, ErrorKind::SystemError);
    assert!(outcome.output_text.contains("codexec-no-such-compiler"));
    assert!(outcome.response_text().starts_with("SYSTEM ERROR: "));
    assert!(leftovers(dir.path()).is_empty());
}

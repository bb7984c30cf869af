use codexec::{ErrorKind, ExecutionRequest};

use super::{fixture_source, leftovers, test_runner};

#[tokio::test]
async fn test_c_syntax_error() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("c", fixture_source("compile_error.c"));

    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::CompilationError);
    assert!(outcome.output_text.contains("error"));
    assert!(outcome.response_text().starts_with("COMPILATION ERROR:\n"));
    // Neither the source nor a half-built binary remains
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_cpp_undeclared_identifier() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("cpp", fixture_source("compile_error.cpp"));

    let outcome = runner.execute(&request).await;

    assert_eq!(outcome.error_kind, ErrorKind::CompilationError);
    assert!(outcome.output_text.contains("undeclared_name"));
    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test]
async fn test_c_source_as_cpp_still_compiles() {
    let (runner, dir) = test_runner();
    let request = ExecutionRequest::new("cpp", fixture_source("hello.c"));

    let outcome = runner.execute(&request).await;

    assert!(outcome.is_success(), "{outcome:?}");
    assert!(leftovers(dir.path()).is_empty());
}

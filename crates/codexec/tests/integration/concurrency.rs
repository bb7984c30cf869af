use codexec::{ErrorKind, ExecutionRequest};

use super::{leftovers, test_runner};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_are_isolated() {
    let (runner, dir) = test_runner();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let runner = runner.clone();
            let (language, source) = match i % 3 {
                0 => ("python", format!("print({i})\n")),
                1 => (
                    "c",
                    format!("#include <stdio.h>\nint main(void) {{ printf(\"%d\\n\", {i}); return 0; }}\n"),
                ),
                _ => (
                    "cpp",
                    format!("#include <iostream>\nint main() {{ std::cout << {i} << std::endl; }}\n"),
                ),
            };
            tokio::spawn(async move {
                let outcome = runner.execute(&ExecutionRequest::new(language, source)).await;
                (i, outcome)
            })
        })
        .collect();

    for task in tasks {
        let (i, outcome) = task.await.unwrap();
        assert_eq!(outcome.error_kind, ErrorKind::None, "{outcome:?}");
        assert_eq!(outcome.output_text, format!("{i}\n"));
    }

    assert!(leftovers(dir.path()).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_snippet_many_times() {
    let (runner, dir) = test_runner();
    let source = "print('same')\n";

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let runner = runner.clone();
            tokio::spawn(async move {
                runner.execute(&ExecutionRequest::new("python", source)).await
            })
        })
        .collect();

    for task in tasks {
        let outcome = task.await.unwrap();
        assert_eq!(outcome.output_text, "same\n");
    }

    assert!(leftovers(dir.path()).is_empty());
}

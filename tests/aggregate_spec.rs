//! Task aggregation tests.

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use timesheet_digest::clickup::{ClientError, Endpoint};
use timesheet_digest::models::*;
use timesheet_digest::pipeline::{group_entries, Aggregator, PipelineError};

fn entries(values: &[Value]) -> Vec<TimeEntry> {
    values
        .iter()
        .map(|v| serde_json::from_value(v.clone()).expect("Invalid entry fixture"))
        .collect()
}

/// Two tasks with comments; t1 has two subtasks.
fn standard_fixture() -> (Fixture, Vec<TimeEntry>) {
    let raw = vec![
        time_entry("e1", "t1", 3_600_000),
        time_entry("e2", "t2", 1_800_000),
        time_entry("e3", "t1", 900_000),
    ];
    let fixture = Fixture::default()
        .with_entries(raw.clone())
        .with_task(task("t1", "Checkout flow", &[("s1", "Payment form"), ("s2", "Receipt")]))
        .with_task(task("t2", "Search", &[]))
        .with_comments("t1", vec![comment("c1", "started"), comment("c2", "blocked on API")])
        .with_comments("s1", vec![comment("c3", "done")])
        .with_comments("t2", vec![comment("c4", "reindexed")]);
    (fixture, entries(&raw))
}

fn entry_ids(record: &TaskRecord) -> Vec<&str> {
    record.time_entries.iter().map(|e| e.id.as_str()).collect()
}

fn assert_comment_failure(err: PipelineError, expected: StatusCode) {
    match err {
        PipelineError::Client(ClientError::Upstream {
            status, endpoint, ..
        }) => {
            assert_eq!(status, expected);
            assert_eq!(endpoint, Endpoint::Comments);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

mod grouping {
    use super::*;

    #[test]
    fn preserves_discovery_and_entry_order() {
        let input = entries(&[
            time_entry("e1", "t1", 1),
            time_entry("e2", "t2", 1),
            time_entry("e3", "t1", 1),
            time_entry("e4", "t3", 1),
            time_entry("e5", "t2", 1),
        ]);

        let tasks = group_entries(input);

        assert_eq!(tasks.keys().collect::<Vec<_>>(), vec!["t1", "t2", "t3"]);
        assert_eq!(entry_ids(tasks.get("t1").unwrap()), vec!["e1", "e3"]);
        assert_eq!(entry_ids(tasks.get("t2").unwrap()), vec!["e2", "e5"]);
        assert_eq!(entry_ids(tasks.get("t3").unwrap()), vec!["e4"]);
    }

    #[test]
    fn skips_entries_without_a_task() {
        let mut raw = vec![time_entry("e1", "t1", 1)];
        raw.push(json!({ "id": "e2", "duration": "60000" }));
        raw.push(json!({ "id": "e3", "task": null }));

        let tasks = group_entries(entries(&raw));

        assert_eq!(tasks.len(), 1);
        assert_eq!(entry_ids(tasks.get("t1").unwrap()), vec!["e1"]);
    }
}

mod enrichment {
    use super::*;

    #[tokio::test]
    async fn builds_nested_document() {
        let (fixture, input) = standard_fixture();
        let server = MockServer::start(fixture).await;

        let tasks = Aggregator::new(server.client())
            .aggregate(input)
            .await
            .expect("Aggregation failed");

        assert_eq!(tasks.keys().collect::<Vec<_>>(), vec!["t1", "t2"]);

        let t1 = tasks.get("t1").unwrap();
        assert_eq!(t1.name, "Checkout flow");
        assert_eq!(entry_ids(t1), vec!["e1", "e3"]);
        assert_eq!(t1.tracked_ms(), 4_500_000);
        assert_eq!(t1.comments.len(), 2);
        assert_eq!(t1.comments[1].comment_text, "blocked on API");
        assert_eq!(t1.subtasks.keys().collect::<Vec<_>>(), vec!["s1", "s2"]);

        let s1 = t1.subtasks.get("s1").unwrap();
        assert_eq!(s1.name, "Payment form");
        assert_eq!(s1.fields.get("parent"), Some(&json!("t1")));
        assert_eq!(s1.comments.len(), 1);
        assert!(t1.subtasks.get("s2").unwrap().comments.is_empty());

        let t2 = tasks.get("t2").unwrap();
        assert_eq!(t2.name, "Search");
        assert!(t2.subtasks.is_empty());
    }

    #[tokio::test]
    async fn sequential_requests_follow_discovery_order() {
        let (fixture, input) = standard_fixture();
        let server = MockServer::start(fixture).await;

        Aggregator::new(server.client())
            .aggregate(input)
            .await
            .expect("Aggregation failed");

        assert_eq!(
            server.routes(),
            vec![
                "task/t1",
                "task/t1/comment",
                "task/s1/comment",
                "task/s2/comment",
                "task/t2",
                "task/t2/comment",
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_subtask_reference_is_fetched_once() {
        let raw = vec![time_entry("e1", "t1", 1)];
        let server = MockServer::start(
            Fixture::default()
                .with_task(task("t1", "Parent", &[("s1", "Child"), ("s2", "Other"), ("s1", "Child again")]))
                .with_comments("s1", vec![comment("c1", "only once")]),
        )
        .await;

        let tasks = Aggregator::new(server.client())
            .aggregate(entries(&raw))
            .await
            .expect("Aggregation failed");

        let t1 = tasks.get("t1").unwrap();
        assert_eq!(t1.subtasks.len(), 2);
        assert_eq!(t1.subtasks.get("s1").unwrap().name, "Child");
        assert_eq!(t1.subtasks.get("s1").unwrap().comments.len(), 1);
        assert_eq!(server.count("task/s1/comment"), 1);
    }

    #[tokio::test]
    async fn shared_subtask_stays_under_each_parent() {
        let raw = vec![time_entry("e1", "t1", 1), time_entry("e2", "t2", 1)];
        let server = MockServer::start(
            Fixture::default()
                .with_task(task("t1", "One", &[("s9", "Shared")]))
                .with_task(task("t2", "Two", &[("s9", "Shared")])),
        )
        .await;

        let tasks = Aggregator::new(server.client())
            .aggregate(entries(&raw))
            .await
            .expect("Aggregation failed");

        assert!(tasks.get("t1").unwrap().subtasks.contains_key("s9"));
        assert!(tasks.get("t2").unwrap().subtasks.contains_key("s9"));
        assert_eq!(server.count("task/s9/comment"), 2);
    }

    #[tokio::test]
    async fn aggregation_is_idempotent() {
        let (fixture, input) = standard_fixture();
        let server = MockServer::start(fixture).await;
        let aggregator = Aggregator::new(server.client());

        let first = aggregator.aggregate(input.clone()).await.expect("First run failed");
        let second = aggregator.aggregate(input).await.expect("Second run failed");

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn empty_input_makes_no_requests() {
        let server = MockServer::start(Fixture::default()).await;

        let tasks = Aggregator::new(server.client())
            .aggregate(Vec::new())
            .await
            .expect("Aggregation failed");

        assert!(tasks.is_empty());
        assert!(server.requests().is_empty());
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn subtask_comment_failure_aborts_aggregation() {
        let (fixture, input) = standard_fixture();
        let server = MockServer::start(fixture.failing("task/s1/comment", 500)).await;

        let err = Aggregator::new(server.client())
            .aggregate(input)
            .await
            .unwrap_err();

        assert_comment_failure(err, StatusCode::INTERNAL_SERVER_ERROR);
        // Nothing after the failed fetch is requested.
        assert_eq!(server.count("task/s2/comment"), 0);
        assert_eq!(server.count("task/t2"), 0);
    }

    #[tokio::test]
    async fn task_fetch_failure_aborts_aggregation() {
        let (fixture, input) = standard_fixture();
        let server = MockServer::start(fixture.failing("task/t2", 403)).await;

        let err = Aggregator::new(server.client())
            .aggregate(input)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Client(ClientError::Upstream {
                endpoint: Endpoint::Task,
                ..
            })
        ));
    }
}

mod concurrent {
    use super::*;

    fn many_tasks() -> (Fixture, Vec<TimeEntry>) {
        let mut fixture = Fixture::default();
        let mut raw = Vec::new();
        for i in 0..12 {
            let id = format!("t{}", i);
            let sub = format!("s{}", i);
            raw.push(time_entry(&format!("e{}", i), &id, 60_000));
            raw.push(time_entry(&format!("e{}b", i), &id, 60_000));
            fixture = fixture
                .with_task(task(&id, &format!("Task {}", i), &[(sub.as_str(), "Sub")]))
                .with_comments(&sub, vec![comment(&format!("c{}", i), "note")]);
        }
        (fixture.with_entries(raw.clone()), entries(&raw))
    }

    #[tokio::test]
    async fn matches_sequential_result() {
        let (fixture, input) = many_tasks();
        let server = MockServer::start(fixture).await;

        let sequential = Aggregator::new(server.client())
            .aggregate(input.clone())
            .await
            .expect("Sequential run failed");
        let parallel = Aggregator::new(server.client())
            .with_concurrency(4)
            .aggregate(input)
            .await
            .expect("Concurrent run failed");

        assert_eq!(parallel, sequential);
        let keys: Vec<String> = (0..12).map(|i| format!("t{}", i)).collect();
        assert_eq!(parallel.keys().collect::<Vec<_>>(), keys);
    }

    #[tokio::test]
    async fn single_failure_fails_the_run() {
        let (fixture, input) = many_tasks();
        let server = MockServer::start(fixture.failing("task/s7/comment", 502)).await;

        let err = Aggregator::new(server.client())
            .with_concurrency(4)
            .aggregate(input)
            .await
            .unwrap_err();

        assert_comment_failure(err, StatusCode::BAD_GATEWAY);
    }
}

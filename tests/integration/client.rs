//! HTTP client behavior against a loopback stub server.

use chrono::NaiveDate;
use triage::api::AnalysisClient;
use triage::Error;

use crate::fixtures::{dead_endpoint, task, StubServer};

#[tokio::test]
async fn analyze_decodes_success_response() {
    let stub = StubServer::spawn(
        200,
        r#"{"tasks":[{"id":"a","title":"A","score":0.9,"reason":"urgent"}],"cycles":[["a","b"]]}"#,
    );
    let client = AnalysisClient::new(stub.endpoint.clone());

    let analysis = client
        .analyze(&[task("a", &[])], "smart_balance", None)
        .await
        .unwrap();

    assert_eq!(analysis.tasks.len(), 1);
    assert_eq!(analysis.tasks[0].task.id, "a");
    assert_eq!(analysis.tasks[0].score, 0.9);
    assert_eq!(analysis.cycles, vec![vec!["a".to_string(), "b".to_string()]]);

    let request = stub.finish();
    assert!(request.starts_with("POST /api/tasks/analyze/?strategy=smart_balance"));
    assert!(request.contains("\"id\":\"a\""));
}

#[tokio::test]
async fn analyze_forwards_today_override() {
    let stub = StubServer::spawn(200, r#"{"tasks":[],"cycles":[]}"#);
    let client = AnalysisClient::new(stub.endpoint.clone());

    client
        .analyze(
            &[task("a", &[])],
            "deadline_driven",
            NaiveDate::from_ymd_opt(2025, 3, 1),
        )
        .await
        .unwrap();

    let request = stub.finish();
    assert!(request.contains("strategy=deadline_driven"));
    assert!(request.contains("today=2025-03-01"));
}

#[tokio::test]
async fn analyze_missing_fields_default_to_empty() {
    let stub = StubServer::spawn(200, "{}");
    let client = AnalysisClient::new(stub.endpoint.clone());

    let analysis = client
        .analyze(&[task("a", &[])], "smart_balance", None)
        .await
        .unwrap();
    assert!(analysis.tasks.is_empty());
    assert!(analysis.cycles.is_empty());
    stub.finish();
}

#[tokio::test]
async fn analyze_non_2xx_yields_service_error_with_body() {
    let stub = StubServer::spawn(400, r#"{"error":"expected a JSON array of tasks"}"#);
    let client = AnalysisClient::new(stub.endpoint.clone());

    let err = client
        .analyze(&[task("a", &[])], "smart_balance", None)
        .await
        .unwrap_err();

    match err {
        Error::Service { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("expected a JSON array"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
    stub.finish();
}

#[tokio::test]
async fn analyze_transport_failure_yields_network_error() {
    let client = AnalysisClient::new(dead_endpoint());

    let err = client
        .analyze(&[task("a", &[])], "smart_balance", None)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Network(_)),
        "expected network error, got {:?}",
        err
    );
}

#[tokio::test]
async fn feedback_posts_task_id_and_flag() {
    let stub = StubServer::spawn(200, r#"{"status":"ok"}"#);
    let client = AnalysisClient::new(stub.endpoint.clone());

    client.feedback("write_report_1", false).await.unwrap();

    let request = stub.finish();
    assert!(request.starts_with("POST /api/tasks/feedback/"));
    assert!(request.contains("\"task_id\":\"write_report_1\""));
    assert!(request.contains("\"helpful\":false"));
}

#[tokio::test]
async fn feedback_non_2xx_is_a_service_error() {
    let stub = StubServer::spawn(500, r#"{"error":"unable to save feedback"}"#);
    let client = AnalysisClient::new(stub.endpoint.clone());

    let err = client.feedback("t1", true).await.unwrap_err();
    match err {
        Error::Service { status, .. } => assert_eq!(status, 500),
        other => panic!("expected service error, got {:?}", other),
    }
    stub.finish();
}

#[tokio::test]
async fn suggest_returns_top_picks() {
    let stub = StubServer::spawn(
        200,
        r#"{"suggestions":[{"id":"a","title":"A","score":0.95,"reason":"top"}]}"#,
    );
    let client = AnalysisClient::new(stub.endpoint.clone());

    let suggestions = client
        .suggest(&[task("a", &[]), task("b", &[])], "smart_balance")
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].task.id, "a");

    let request = stub.finish();
    assert!(request.starts_with("GET /api/tasks/suggest/?strategy=smart_balance"));
    assert!(request.contains("\"tasks\""));
}

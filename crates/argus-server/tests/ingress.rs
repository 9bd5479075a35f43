use argus_runtime::InboxEvent;
use argus_server::{create_app, AppState};
use argus_types::Snapshot;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::collections::BTreeMap;
use tower::ServiceExt;

fn empty_snapshot() -> Snapshot {
    Snapshot {
        projects: BTreeMap::new(),
        completed_work: Vec::new(),
        last_updated: 0,
    }
}

fn test_state() -> (AppState, tokio::sync::mpsc::Receiver<InboxEvent>) {
    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let publisher = argus_runtime::Publisher::new(empty_snapshot());
    (AppState::new(tx, publisher), rx)
}

#[tokio::test]
async fn valid_envelope_is_forwarded_to_the_inbox() {
    let (state, mut rx) = test_state();
    let app = create_app(state);

    let body = serde_json::json!({
        "type": "session_start",
        "sessionId": "s1",
        "projectPath": "/home/me/proj",
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = rx.try_recv().expect("event forwarded to inbox");
    match event {
        InboxEvent::SessionStart { session_id, project_name, .. } => {
            assert_eq!(session_id, "s1");
            assert_eq!(project_name, "proj");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn envelope_missing_required_fields_is_rejected_with_400() {
    let (state, mut rx) = test_state();
    let app = create_app(state);

    let body = serde_json::json!({"type": "activity"});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn get_state_returns_the_published_snapshot() {
    let (state, _rx) = test_state();
    let publisher = state.publisher.clone();
    let app = create_app(state);

    let mut snapshot = empty_snapshot();
    snapshot.last_updated = 42;
    publisher.publish(snapshot);

    let response = app
        .oneshot(Request::builder().uri("/state").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let got: Snapshot = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(got.last_updated, 42);
}

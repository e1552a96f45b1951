pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/fields",
            post(handlers::handle_submit_field),
        )
        .route(
            "/api/v1/sessions/:id/fields/skip",
            post(handlers::handle_skip_field),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:id/override",
            post(handlers::handle_override),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::scripted::ScriptedBackend;
    use crate::models::candidate::CandidateProfile;
    use crate::models::session::{FormStep, ScreeningSession};
    use crate::screening::anonymizer::anonymize;
    use crate::storage::reports::FileReportStore;
    use crate::storage::sessions::{InMemorySessionStore, SessionLocks, SessionStore};

    const ALIGNED: &str = "Thank you for your response. Your answer is mostly correct and aligns well with the question.";
    const WRONG: &str = "Thank you for your response. It's a good attempt, but the answer is not correct.";

    struct Harness {
        router: Router,
        llm: Arc<ScriptedBackend>,
        sessions: Arc<InMemorySessionStore>,
        reports_dir: tempfile::TempDir,
    }

    fn harness(llm: ScriptedBackend) -> Harness {
        let llm = Arc::new(llm);
        let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
        let reports_dir = tempfile::tempdir().unwrap();
        let state = AppState {
            llm: llm.clone(),
            sessions: sessions.clone(),
            session_locks: Arc::new(SessionLocks::default()),
            reports: Arc::new(FileReportStore::new(reports_dir.path())),
        };
        Harness {
            router: build_router(state),
            llm,
            sessions,
            reports_dir,
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(router: &Router) -> String {
        let (status, body) = send(router, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["greeting"].as_str().unwrap().contains("TalentScout"));
        body["session"]["session_id"].as_str().unwrap().to_string()
    }

    async fn fill_profile(router: &Router, id: &str) -> Value {
        let values = [
            json!("Alice"),
            json!("alice@example.com"),
            json!("+1 555 0100"),
            json!(3),
            json!("Backend Engineer"),
            json!("Lisbon"),
            json!("Rust, PostgreSQL"),
        ];
        let mut last = Value::Null;
        for (i, value) in values.into_iter().enumerate() {
            let (status, body) = send(
                router,
                Method::POST,
                &format!("/api/v1/sessions/{id}/fields"),
                Some(json!({ "step": i + 1, "value": value })),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "step {}: {body}", i + 1);
            last = body;
        }
        last
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(ScriptedBackend::new());
        let (status, body) = send(&h.router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let h = harness(ScriptedBackend::new());
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&h.router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_field_is_rejected_and_render_does_not_advance() {
        let h = harness(ScriptedBackend::new());
        let id = create(&h.router).await;

        let (status, body) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/fields"),
            Some(json!({ "value": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        for _ in 0..2 {
            let (status, view) =
                send(&h.router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(view["step"], 1);
        }
    }

    #[tokio::test]
    async fn test_full_flow_with_override_writes_report() {
        let h = harness(
            ScriptedBackend::new()
                .reply("1. What is ownership?\n2. What is a lifetime?\n3. What is a trait?")
                .reply(WRONG)
                .reply("4")
                .reply(ALIGNED)
                .reply("Score: 8/10")
                .reply(ALIGNED)
                .reply("no idea"),
        );
        let id = create(&h.router).await;

        let last = fill_profile(&h.router, &id).await;
        assert_eq!(last["session"]["step"], 8);
        assert_eq!(last["session"]["question"]["number"], 1);
        assert_eq!(last["session"]["question"]["text"], "What is ownership?");

        // Rendering again does not regenerate questions.
        send(&h.router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(h.llm.calls(), 1);

        let answers = format!("/api/v1/sessions/{id}/answers");
        let (status, body) =
            send(&h.router, Method::POST, &answers, Some(json!({ "answer": "It moves" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["alignment"], "misaligned");
        assert_eq!(body["outcome"]["advanced"], false);
        assert_eq!(body["session"]["question"]["number"], 1);
        assert!(body["session"]["pending_error"].as_str().unwrap().contains("Continue Anyway"));

        let (status, view) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/override"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["question"]["number"], 2);
        assert!(view.get("pending_error").is_none());

        send(&h.router, Method::POST, &answers, Some(json!({ "answer": "A scope" }))).await;
        let (_, body) =
            send(&h.router, Method::POST, &answers, Some(json!({ "answer": "An interface" }))).await;

        let completion = &body["session"]["completion"];
        assert_eq!(completion["average_score"], 6.0);
        assert_eq!(completion["report_write"]["status"], "saved");
        assert!(body["session"].get("question").is_none());

        let path = h.reports_dir.path().join(format!("{}.json", anonymize("Alice")));
        let record: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(record.as_object().unwrap().len(), 4);
        assert_eq!(record["Q1"]["answer"], "It moves");
        assert_eq!(record["Q1"]["score"], 4.0);
        assert_eq!(record["Q2"]["score"], 8.0);
        assert!(record["Q3"]["score"].is_null());
        assert_eq!(record["average_score"], 6.0);

        // Completed sessions render idempotently and make no further calls.
        let calls = h.llm.calls();
        let (_, view) = send(&h.router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(view["completion"]["average_score"], 6.0);
        assert_eq!(h.llm.calls(), calls);
    }

    #[tokio::test]
    async fn test_generation_failure_halts_until_reset() {
        let h = harness(ScriptedBackend::new().fail(500));
        let id = create(&h.router).await;

        for value in [json!("Bob"), json!("bob@example.com")] {
            send(
                &h.router,
                Method::POST,
                &format!("/api/v1/sessions/{id}/fields"),
                Some(json!({ "value": value })),
            )
            .await;
        }
        let (status, _) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/fields/skip"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        for value in [json!(0), json!("SRE"), json!("Porto")] {
            send(
                &h.router,
                Method::POST,
                &format!("/api/v1/sessions/{id}/fields"),
                Some(json!({ "value": value })),
            )
            .await;
        }
        let (status, body) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/fields"),
            Some(json!({ "value": "Go, Kubernetes" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");

        let (status, view) =
            send(&h.router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], 8);
        assert!(view["halted"].is_string());

        let (status, _) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/answers"),
            Some(json!({ "answer": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(h.llm.calls(), 1);

        let (status, view) = send(
            &h.router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/reset"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["step"], 1);
        assert!(view.get("halted").is_none());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let h = harness(ScriptedBackend::new());
        let id = create(&h.router).await;
        let uri = format!("/api/v1/sessions/{id}");

        let (status, _) = send(&h.router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&h.router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_concurrent_requests_on_one_session_are_serialized() {
        let h = harness(
            ScriptedBackend::new()
                .with_latency(Duration::from_millis(20))
                .reply("1. What is ownership?\n2. What is a lifetime?\n3. What is a trait?")
                .reply(ALIGNED)
                .reply("7")
                .reply(ALIGNED)
                .reply("8"),
        );
        let mut session = ScreeningSession::new();
        session.step = FormStep::Questions;
        session.candidate = CandidateProfile {
            experience_years: Some(3),
            position: Some("Backend Engineer".to_string()),
            tech_stack: Some("Rust, PostgreSQL".to_string()),
            ..Default::default()
        };
        h.sessions.save(&session).await.unwrap();
        let id = session.id;

        let uri = format!("/api/v1/sessions/{id}");
        let ((first, a), (second, b)) = tokio::join!(
            send(&h.router, Method::GET, &uri, None),
            send(&h.router, Method::GET, &uri, None),
        );
        assert_eq!((first, second), (StatusCode::OK, StatusCode::OK));
        assert_eq!(a["question"]["text"], b["question"]["text"]);
        assert_eq!(h.llm.calls(), 1);

        let answers = format!("/api/v1/sessions/{id}/answers");
        let ((first, a), (second, b)) = tokio::join!(
            send(&h.router, Method::POST, &answers, Some(json!({ "answer": "first" }))),
            send(&h.router, Method::POST, &answers, Some(json!({ "answer": "second" }))),
        );
        assert_eq!((first, second), (StatusCode::OK, StatusCode::OK));
        assert_eq!(a["outcome"]["advanced"], true);
        assert_eq!(b["outcome"]["advanced"], true);
        assert_eq!(h.llm.calls(), 5);

        let stored = h.sessions.load(id).await.unwrap().unwrap();
        assert_eq!(stored.current_question_index, 2);
        assert_eq!(stored.scores.len(), 2);
        let mut responses = stored.responses.clone();
        responses.sort();
        assert_eq!(responses, vec!["first", "second"]);
    }
}

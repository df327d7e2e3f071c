//! Chat message integration tests
//!
//! Thread continuation over time, failure handling and the same-user race.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration};
use serde_json::Value;

use chatai_chat::{ChatRepositories, ChatService, ThreadResolver, ThreadStore};
use chatai_users::{InMemoryUserStore, User, UserRole, UserStore};

use crate::common::{get_request, parse_body, FailingLlm, TestApp};

const KIM: &str = "kim@example.com";

async fn chat_ok(app: &TestApp, email: &str, question: &str) -> Value {
    let response = app.chat(email, question).await;
    assert_eq!(response.status(), StatusCode::OK, "chat {:?} failed", question);
    parse_body(response).await
}

const LATEST_THREAD: &str = "/api/v1/chat/threads/latest";

async fn latest_thread(app: &TestApp, email: &str) -> Value {
    let token = app.sign_in(email).await;
    let response = app.send(get_request(LATEST_THREAD, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    parse_body(response).await
}

mod test_thread_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_first_message_creates_thread_one() {
        let app = TestApp::new();
        app.sign_up(KIM).await;

        let body = chat_ok(&app, KIM, "hello").await;

        assert_eq!(body["threadId"], 1);
        assert_eq!(body["question"], "hello");
        assert_eq!(
            body["answer"],
            "Hello! I'm an AI assistant. How can I help you today?"
        );
        let created_at: DateTime<chrono::Utc> =
            body["createdAt"].as_str().unwrap().parse().unwrap();
        assert_eq!(created_at, clock_now(&app));

        assert_eq!(app.thread_count(), 1);
        assert_eq!(app.message_count(), 1);
    }

    #[tokio::test]
    async fn test_conversation_across_timeout() {
        let app = TestApp::new();
        app.sign_up(KIM).await;

        let first = chat_ok(&app, KIM, "hello").await;
        assert_eq!(first["threadId"], 1);

        // 20 minutes later: same thread, two messages
        app.clock.advance(Duration::minutes(20));
        let second = chat_ok(&app, KIM, "what is your name?").await;
        assert_eq!(second["threadId"], 1);

        let thread = latest_thread(&app, KIM).await;
        assert_eq!(thread["id"], 1);
        assert_eq!(thread["messages"].as_array().unwrap().len(), 2);
        assert_eq!(thread["messages"][0]["question"], "hello");
        assert_eq!(thread["messages"][1]["question"], "what is your name?");

        // 31 minutes after the second message: new thread, old history left behind
        app.clock.advance(Duration::minutes(31));
        let third = chat_ok(&app, KIM, "tell me about the weather").await;
        assert_eq!(third["threadId"], 2);

        let thread = latest_thread(&app, KIM).await;
        assert_eq!(thread["id"], 2);
        let messages = thread["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["question"], "tell me about the weather");

        assert_eq!(app.thread_count(), 2);
        assert_eq!(app.message_count(), 3);
    }

    #[tokio::test]
    async fn test_exactly_thirty_minutes_starts_new_thread() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        chat_ok(&app, KIM, "hello").await;

        app.clock.advance(Duration::minutes(29));
        assert_eq!(chat_ok(&app, KIM, "still here").await["threadId"], 1);

        app.clock.advance(Duration::minutes(30));
        assert_eq!(chat_ok(&app, KIM, "back again").await["threadId"], 2);
    }

    #[tokio::test]
    async fn test_threads_are_per_user() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        app.sign_up("lee@example.com").await;

        assert_eq!(chat_ok(&app, KIM, "hello").await["threadId"], 1);
        assert_eq!(chat_ok(&app, "lee@example.com", "hello").await["threadId"], 2);
        assert_eq!(chat_ok(&app, KIM, "again").await["threadId"], 1);
    }

    #[tokio::test]
    async fn test_latest_thread_without_history_is_404() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        let token = app.sign_in(KIM).await;

        let response = app.send(get_request(LATEST_THREAD, Some(&token))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_latest_thread_requires_a_token() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        chat_ok(&app, KIM, "my bank pin is 1234, remember it").await;

        let response = app.send(get_request(LATEST_THREAD, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = parse_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

        // The old query parameter grants nothing either
        let response = app
            .send(get_request(
                &format!("{}?userEmail={}", LATEST_THREAD, KIM),
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_latest_thread_is_the_callers_own() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        app.sign_up("lee@example.com").await;
        chat_ok(&app, KIM, "kim's secret").await;
        chat_ok(&app, "lee@example.com", "lee's question").await;

        let lee = latest_thread(&app, "lee@example.com").await;
        assert_eq!(lee["id"], 2);
        let messages = lee["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["question"], "lee's question");
    }

    #[tokio::test]
    async fn test_latest_thread_rejects_forged_token() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        chat_ok(&app, KIM, "hello").await;

        let response = app
            .send(get_request(LATEST_THREAD, Some("forged.token.value")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn clock_now(app: &TestApp) -> DateTime<chrono::Utc> {
        use mockable::Clock;
        app.clock.utc()
    }
}

mod test_failures {
    use super::*;

    #[tokio::test]
    async fn test_whitespace_question_fails_before_persistence() {
        let app = TestApp::new();
        app.sign_up(KIM).await;

        let response = app.chat(KIM, "\t\n").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        assert_eq!(app.thread_count(), 0);
        assert_eq!(app.message_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_bad_request() {
        let app = TestApp::new();

        let response = app.chat("ghost@example.com", "hello").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = parse_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("ghost@example.com"));

        assert_eq!(app.thread_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_502_and_keeps_empty_thread() {
        let llm = Arc::new(FailingLlm::default());
        let app = TestApp::with_llm(llm.clone());
        app.sign_up(KIM).await;

        let response = app.chat(KIM, "hello").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = parse_body(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

        // No retry, and the thread saved before generation is not rolled back
        assert_eq!(*llm.calls.lock().unwrap(), 1);
        assert_eq!(app.thread_count(), 1);
        assert_eq!(app.message_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = TestApp::new();
        let response = app
            .send(crate::common::json_request(
                axum::http::Method::POST,
                "/api/v1/chat/message",
                serde_json::json!({"question": "no email"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_concurrency {
    use super::*;
    use chatai_chat::{InMemoryMessageStore, InMemoryThreadStore};
    use chatai_llm::MockLlmService;
    use crate::common::MutableClock;

    async fn seeded_users() -> Arc<InMemoryUserStore> {
        let users = Arc::new(InMemoryUserStore::new());
        users
            .save(&User {
                id: None,
                email: KIM.to_string(),
                password_hash: "$argon2id$unused".to_string(),
                name: "Kim".to_string(),
                role: UserRole::Member,
                registered_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        users
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_user_messages_serialize_within_a_process() {
        let app = TestApp::new();
        app.sign_up(KIM).await;
        chat_ok(&app, KIM, "hello").await;
        app.clock.advance(Duration::minutes(45));

        let app = Arc::new(app);
        let mut handles = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                chat_ok(&app, KIM, &format!("racing message {}", i)).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap()["threadId"], 2);
        }
        assert_eq!(app.thread_count(), 2);
        assert_eq!(app.message_count(), 9);
    }

    /// Known limitation: orchestrators in separate processes share only the
    /// database, so nothing stops both from starting a thread for one user.
    #[tokio::test]
    async fn test_separate_processes_can_both_start_a_thread() {
        let users = seeded_users().await;
        let threads = Arc::new(InMemoryThreadStore::new());
        let messages = Arc::new(InMemoryMessageStore::new());
        let clock = Arc::new(MutableClock::new(chrono::Utc::now()));

        let replica = || {
            ChatService::new(
                users.clone(),
                ChatRepositories {
                    threads: threads.clone(),
                    messages: messages.clone(),
                },
                Arc::new(MockLlmService::new()),
                clock.clone(),
                ThreadResolver::default(),
            )
        };
        let (a, b) = (replica(), replica());

        a.send_message(KIM, "hello").await.unwrap();
        clock.advance(Duration::minutes(45));

        // Both replicas read the same stale latest thread before either writes
        let stale = threads.find_latest_for_user(1).await.unwrap();
        let now = mockable::Clock::utc(clock.as_ref());
        let resolver = ThreadResolver::default();
        let from_a = threads.save(&resolver.resolve(1, stale.clone(), now)).await.unwrap();
        let from_b = threads.save(&resolver.resolve(1, stale, now)).await.unwrap();
        assert_ne!(from_a.id, from_b.id);

        // Each replica then continues whichever thread is latest
        let reply = b.send_message(KIM, "which thread?").await.unwrap();
        assert_eq!(Some(reply.thread_id), from_b.id);
        assert_eq!(threads.len().unwrap(), 3);
    }
}

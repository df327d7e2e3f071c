//! Sign-up, sign-in and token-protected profile tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use chatai_auth::validate_jwt_token;

use crate::common::{get_request, json_request, parse_body, TestApp, TEST_PASSWORD};

mod test_sign_up {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_returns_created_member() {
        let app = TestApp::new();
        let body = app.sign_up("kim@example.com").await;

        assert_eq!(body["id"], 1);
        assert_eq!(body["email"], "kim@example.com");
        assert_eq!(body["name"], "Test User");
        assert_eq!(body["role"], "MEMBER");
        assert!(body["registeredAt"].is_string());
        assert!(body.get("passwordHash").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_returns_409() {
        let app = TestApp::new();
        app.sign_up("kim@example.com").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-up",
                json!({"email": "kim@example.com", "password": TEST_PASSWORD, "name": "Kim"}),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = parse_body(response).await;
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_invalid_payloads_return_400() {
        let app = TestApp::new();
        let payloads = [
            json!({"email": "not-an-email", "password": TEST_PASSWORD, "name": "Kim"}),
            json!({"email": "kim@example.com", "password": "short", "name": "Kim"}),
            json!({"email": "kim@example.com", "password": TEST_PASSWORD, "name": ""}),
            json!({"email": "kim@example.com"}),
        ];

        for payload in payloads {
            let response = app
                .send(json_request(Method::POST, "/api/v1/auth/sign-up", payload))
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}

mod test_sign_in {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_returns_bearer_token() {
        let app = TestApp::new();
        app.sign_up("kim@example.com").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-in",
                json!({"email": "kim@example.com", "password": TEST_PASSWORD}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_body(response).await;
        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresIn"], 3600);

        let token = body["accessToken"].as_str().unwrap();
        let claims = validate_jwt_token(token, &app.auth_config).unwrap();
        assert_eq!(claims.user_id(), Some(1));
        assert_eq!(claims.iss.as_deref(), Some("chatai-test"));
    }

    #[tokio::test]
    async fn test_wrong_password_returns_401() {
        let app = TestApp::new();
        app.sign_up("kim@example.com").await;

        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-in",
                json!({"email": "kim@example.com", "password": "definitely-wrong"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_email_returns_400() {
        let app = TestApp::new();

        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/auth/sign-in",
                json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod test_me {
    use super::*;

    #[tokio::test]
    async fn test_me_returns_token_owner() {
        let app = TestApp::new();
        app.sign_up("kim@example.com").await;
        app.sign_up("lee@example.com").await;
        let token = app.sign_in("lee@example.com").await;

        let response = app.send(get_request("/api/v1/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_body(response).await;
        assert_eq!(body["id"], 2);
        assert_eq!(body["email"], "lee@example.com");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = TestApp::new();

        let response = app.send(get_request("/api/v1/auth/me", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = parse_body(response).await;
        assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");
    }

    #[tokio::test]
    async fn test_me_rejects_forged_token() {
        let app = TestApp::new();
        app.sign_up("kim@example.com").await;

        let response = app
            .send(get_request("/api/v1/auth/me", Some("not.a.jwt")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

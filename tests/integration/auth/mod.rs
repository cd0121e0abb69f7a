//! Authentication integration tests
//!
//! Credential extraction order, ID-token/session-cookie fallback, and the
//! mandatory/optional middleware contracts, observed through `/auth/me`
//! and the greeting routes.

use axum::{body::Body, http::StatusCode};
use gatehouse_identity::{IdentityProvider, MockIdentityProvider, ProviderCall};
use serde_json::json;

use crate::common::*;

mod test_mandatory_auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_is_rejected() {
        let app = TestApp::new();

        let request = get("/auth/me").body(Body::empty()).unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Authentication required" }));
        assert!(app.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_credential_is_rejected() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", bearer("forged"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "error": "Invalid or expired authentication token" })
        );
    }

    #[tokio::test]
    async fn test_valid_bearer_id_token() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", bearer(VALID_ID_TOKEN))
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], TEST_UID);
        assert_eq!(body["user"]["email"], TEST_EMAIL);
        assert_eq!(body["user"]["name"], TEST_NAME);
        assert_eq!(body["user"]["tokenType"], "id");
        assert!(body["user"]["issuedAt"].is_string());
        assert!(body["user"]["expiresAt"].is_string());
        assert_eq!(body["user"]["claims"]["sub"], TEST_UID);
    }

    #[tokio::test]
    async fn test_verification_checks_revocation() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", bearer(VALID_ID_TOKEN))
            .body(Body::empty())
            .unwrap();
        app.send(request).await;

        assert_eq!(
            app.provider.calls(),
            vec![ProviderCall::VerifyIdToken {
                token: VALID_ID_TOKEN.to_string(),
                check_revoked: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_session_cookie_fallback_reports_session_kind() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", bearer(VALID_SESSION_COOKIE))
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], TEST_UID);
        assert_eq!(body["user"]["tokenType"], "session");

        let calls = app.provider.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], ProviderCall::VerifyIdToken { .. }));
        assert!(matches!(
            calls[1],
            ProviderCall::VerifySessionCookie {
                check_revoked: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_revoked_subject_is_rejected() {
        let provider = MockIdentityProvider::new()
            .with_id_token(VALID_ID_TOKEN, test_user_token())
            .with_session_cookie(VALID_SESSION_COOKIE, test_user_token());
        let app = TestApp::new().with_provider(provider.clone());

        provider.revoke_refresh_tokens(TEST_UID).await.unwrap();

        let request = get("/auth/me")
            .header("cookie", format!("session={}", VALID_SESSION_COOKIE))
            .body(Body::empty())
            .unwrap();
        let (status, _) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod test_credential_sources {
    use super::*;

    #[tokio::test]
    async fn test_custom_header() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("x-firebase-auth", format!("  {}  ", VALID_ID_TOKEN))
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], TEST_UID);
    }

    #[tokio::test]
    async fn test_session_cookie_among_other_cookies() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header(
                "cookie",
                format!("theme=dark; session={}; lang=en", VALID_SESSION_COOKIE),
            )
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["tokenType"], "session");
    }

    #[tokio::test]
    async fn test_bearer_takes_priority_over_cookie() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", bearer("forged"))
            .header("cookie", format!("session={}", VALID_SESSION_COOKIE))
            .body(Body::empty())
            .unwrap();
        let (status, _) = json_body(app.send(request).await).await;

        // The first credential found is the only one tried
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(app.provider.calls().iter().all(|call| match call {
            ProviderCall::VerifyIdToken { token, .. } => token == "forged",
            ProviderCall::VerifySessionCookie { cookie, .. } => cookie == "forged",
            _ => false,
        }));
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_is_ignored() {
        let app = TestApp::new();

        let request = get("/auth/me")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Authentication required" }));
    }
}

mod test_optional_auth {
    use super::*;

    #[tokio::test]
    async fn test_invalid_credential_continues_anonymously() {
        let app = TestApp::new();

        let request = get("/hello/personal")
            .header("authorization", bearer("forged"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = json_body(app.send(request).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], false);
    }

    #[tokio::test]
    async fn test_valid_credential_is_attached() {
        let app = TestApp::new();

        let request = get("/hello/personal")
            .header("cookie", format!("session={}", VALID_SESSION_COOKIE))
            .body(Body::empty())
            .unwrap();
        let (_, body) = json_body(app.send(request).await).await;

        assert_eq!(body["authenticated"], true);
        assert_eq!(body["message"], format!("Hello, {}!", TEST_NAME));
    }
}

mod test_request_isolation {
    use super::*;
    use gatehouse_identity::DecodedToken;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_concurrent_requests_see_their_own_principal() {
        let provider = MockIdentityProvider::new()
            .with_id_token("token-a", DecodedToken::new("user-a", 0))
            .with_id_token("token-b", DecodedToken::new("user-b", 0));
        let app = TestApp::new().with_provider(provider);
        let router = app.router();

        let me = |token: &str| {
            get("/auth/me")
                .header("authorization", bearer(token))
                .body(Body::empty())
                .unwrap()
        };

        let (first, second, anonymous) = tokio::join!(
            router.clone().oneshot(me("token-a")),
            router.clone().oneshot(me("token-b")),
            router
                .clone()
                .oneshot(get("/hello/personal").body(Body::empty()).unwrap()),
        );

        let (status, body) = json_body(first.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], "user-a");

        let (status, body) = json_body(second.unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], "user-b");

        let (_, body) = json_body(anonymous.unwrap()).await;
        assert_eq!(body["authenticated"], false);
    }
}

//! Session lifecycle and guard tests over HTTP
//!
//! Run with: cargo test --test auth_tests

mod common;

use common::{cookie_pair, set_cookie, start_test_server};
use grandstay::auth::{Claims, Identity, TokenCodec};
use grandstay::config::Environment;
use grandstay::store::Collection;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn assert_unauthorized(response: reqwest::Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "message": "unauthorized access" }));
}

#[tokio::test]
async fn test_issue_session_sets_http_only_cookie() {
    let server = start_test_server(Environment::Development).await;

    let response = server
        .client
        .post(server.url("/jwt"))
        .json(&json!({ "email": "a@x.com", "name": "Ann" }))
        .send()
        .await
        .expect("POST /jwt");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(!cookie.contains("Secure"));

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_production_session_cookie_is_secure() {
    let server = start_test_server(Environment::Production).await;

    let response = server
        .client
        .post(server.url("/jwt"))
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .expect("POST /jwt");

    let cookie = set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));
}

#[tokio::test]
async fn test_logout_clears_with_issue_attributes() {
    for environment in [Environment::Production, Environment::Development] {
        let server = start_test_server(environment).await;

        let issued = server
            .client
            .post(server.url("/jwt"))
            .json(&json!({ "email": "a@x.com" }))
            .send()
            .await
            .expect("POST /jwt");
        let issued = set_cookie(&issued);

        let logout = server
            .client
            .get(server.url("/logout"))
            .send()
            .await
            .expect("GET /logout");
        assert_eq!(logout.status(), StatusCode::OK);
        let cleared = set_cookie(&logout);

        assert_eq!(cookie_pair(&cleared), "token=");
        assert!(cleared.contains("Max-Age=0"));
        for attribute in ["Path=/", "HttpOnly", "Secure", "SameSite=None", "SameSite=Strict"] {
            assert_eq!(
                issued.contains(attribute),
                cleared.contains(attribute),
                "{} mismatch in {} mode",
                attribute,
                environment
            );
        }

        let body: Value = logout.json().await.expect("json body");
        assert_eq!(body, json!({ "success": true }));
    }
}

#[tokio::test]
async fn test_guarded_routes_without_cookie_are_rejected() {
    let server = start_test_server(Environment::Development).await;

    assert_unauthorized(
        server
            .client
            .get(server.url("/bookings?email=a@x.com"))
            .send()
            .await
            .expect("GET /bookings"),
    )
    .await;
    assert_unauthorized(
        server
            .client
            .get(server.url("/users"))
            .send()
            .await
            .expect("GET /users"),
    )
    .await;
    assert_unauthorized(
        server
            .client
            .get(server.url("/admin-stat"))
            .send()
            .await
            .expect("GET /admin-stat"),
    )
    .await;
    assert_unauthorized(
        server
            .client
            .get(server.url("/rooms/h@x.com"))
            .send()
            .await
            .expect("GET /rooms/:email"),
    )
    .await;
}

#[tokio::test]
async fn test_rejected_writes_do_not_mutate() {
    let server = start_test_server(Environment::Development).await;

    let rooms = server
        .client
        .post(server.url("/rooms"))
        .json(&json!({ "title": "Loft", "host": { "email": "h@x.com" } }))
        .send()
        .await
        .expect("POST /rooms");
    assert_unauthorized(rooms).await;

    let bookings = server
        .client
        .post(server.url("/bookings"))
        .json(&json!({ "guest": { "email": "a@x.com" }, "host": "h@x.com" }))
        .send()
        .await
        .expect("POST /bookings");
    assert_unauthorized(bookings).await;

    let update = server
        .client
        .put(server.url("/users/update/a@x.com"))
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("PUT /users/update/:email");
    assert_unauthorized(update).await;

    assert_eq!(server.count(Collection::Rooms).await, 0);
    assert_eq!(server.count(Collection::Bookings).await, 0);
    assert_eq!(server.count(Collection::Users).await, 0);
}

#[tokio::test]
async fn test_tampered_token_is_rejected_like_missing_cookie() {
    let server = start_test_server(Environment::Development).await;
    let cookie = server.login("a@x.com").await;

    let tampered = format!("{}tampered", cookie);
    assert_unauthorized(server.get_with_cookie("/bookings?email=a@x.com", &tampered).await).await;

    let garbage = "token=not-a-jwt";
    assert_unauthorized(server.get_with_cookie("/bookings?email=a@x.com", garbage).await).await;
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let server = start_test_server(Environment::Development).await;
    let foreign = TokenCodec::new(b"some-other-secret", chrono::Duration::days(365));
    let token = foreign.issue(&Identity::new("a@x.com")).expect("issue");

    let response = server
        .get_with_cookie("/bookings?email=a@x.com", &format!("token={}", token))
        .await;
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let server = start_test_server(Environment::Development).await;
    let codec = TokenCodec::from_config(&server.config.auth);
    let now = chrono::Utc::now().timestamp();
    let token = codec
        .encode(&Claims {
            identity: Identity::new("a@x.com"),
            iat: now - 2 * 86_400,
            exp: now - 86_400,
        })
        .expect("encode");

    let response = server
        .get_with_cookie("/bookings?email=a@x.com", &format!("token={}", token))
        .await;
    assert_unauthorized(response).await;
}

#[tokio::test]
async fn test_valid_session_passes_auth_guard() {
    let server = start_test_server(Environment::Development).await;
    let cookie = server.login("a@x.com").await;

    let response = server.get_with_cookie("/bookings?email=a@x.com", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_session_survives_logout_until_expiry() {
    // Logout only clears the browser cookie; the token itself stays valid
    let server = start_test_server(Environment::Development).await;
    let cookie = server.login("a@x.com").await;

    server
        .client
        .get(server.url("/logout"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("GET /logout");

    let response = server.get_with_cookie("/bookings", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_route_requires_admin_role() {
    let server = start_test_server(Environment::Development).await;
    server.add_user("admin@x.com", Some("admin")).await;
    server.add_user("host@x.com", Some("host")).await;
    server.add_user("guest@x.com", None).await;

    let admin = server.login("admin@x.com").await;
    let response = server.get_with_cookie("/users", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<Value> = response.json().await.expect("json body");
    assert_eq!(users.len(), 3);

    for email in ["host@x.com", "guest@x.com", "nobody@x.com"] {
        let cookie = server.login(email).await;
        assert_unauthorized(server.get_with_cookie("/users", &cookie).await).await;
        assert_unauthorized(server.get_with_cookie("/admin-stat", &cookie).await).await;
    }
}

#[tokio::test]
async fn test_host_route_requires_host_role() {
    let server = start_test_server(Environment::Development).await;
    server.add_user("host@x.com", Some("host")).await;
    server.add_user("admin@x.com", Some("admin")).await;

    let host = server.login("host@x.com").await;
    let response = server.get_with_cookie("/rooms/host@x.com", &host).await;
    assert_eq!(response.status(), StatusCode::OK);

    let admin = server.login("admin@x.com").await;
    assert_unauthorized(server.get_with_cookie("/rooms/host@x.com", &admin).await).await;
}

#[tokio::test]
async fn test_role_downgrade_takes_effect_without_new_token() {
    let server = start_test_server(Environment::Development).await;
    server.add_user("admin@x.com", Some("admin")).await;
    let cookie = server.login("admin@x.com").await;

    assert_eq!(
        server.get_with_cookie("/users", &cookie).await.status(),
        StatusCode::OK
    );

    let response = server
        .client
        .put(server.url("/users/update/admin@x.com"))
        .header(COOKIE, &cookie)
        .json(&json!({ "role": "guest" }))
        .send()
        .await
        .expect("PUT /users/update/:email");
    assert_eq!(response.status(), StatusCode::OK);

    assert_unauthorized(server.get_with_cookie("/users", &cookie).await).await;
}

#[tokio::test]
async fn test_cors_allows_configured_origin_with_credentials() {
    let server = start_test_server(Environment::Development).await;

    let preflight = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/bookings"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .expect("OPTIONS /bookings");
    assert!(preflight.status().is_success());
    assert_eq!(
        preflight.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        preflight.headers().get("access-control-allow-credentials").and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let response = server
        .client
        .get(server.url("/rooms"))
        .header("Origin", "http://localhost:5174")
        .send()
        .await
        .expect("GET /rooms");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("http://localhost:5174")
    );
    assert_eq!(
        response.headers().get("access-control-allow-credentials").and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn test_cors_ignores_unlisted_origin() {
    let server = start_test_server(Environment::Development).await;

    let preflight = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/bookings"))
        .header("Origin", "http://evil.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("OPTIONS /bookings");
    assert!(preflight.headers().get("access-control-allow-origin").is_none());

    let response = server
        .client
        .get(server.url("/rooms"))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .expect("GET /rooms");
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_session_with_audience_claim_passes_auth_guard() {
    let server = start_test_server(Environment::Development).await;

    let response = server
        .client
        .post(server.url("/jwt"))
        .json(&json!({ "email": "a@x.com", "aud": "web" }))
        .send()
        .await
        .expect("POST /jwt");
    let cookie = cookie_pair(&set_cookie(&response));

    let response = server.get_with_cookie("/bookings?email=a@x.com", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

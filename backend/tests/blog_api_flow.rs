//! End-to-end flows across the versioned API over the in-memory store.

use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use blog_backend::domain::TRACE_ID_HEADER;
use rstest::rstest;
use serde_json::{Value, json};

mod support;

use support::{Harness, session_cookie};

#[actix_web::test]
async fn author_publishes_and_readers_engage() {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "engine1",
            "passwordConfirm": "engine1",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let author = session_cookie(&response);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/categories")
        .insert_header((header::COOKIE, author.clone()))
        .set_json(json!({"name": "Engineering", "description": "Build notes"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header((header::COOKIE, author.clone()))
        .set_json(json!({
            "title": "Analytical Engines in Rust",
            "excerpt": "Porting notes for the engine",
            "content": "The engine weaves algebraic patterns. ".repeat(3),
            "category": "engineering",
            "tags": ["Rust", "History"],
            "status": "published",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let post: Value = actix_test::read_body_json(response).await;
    let slug = post["slug"].as_str().expect("slug").to_owned();
    assert_eq!(slug, "analytical-engines-in-rust");

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "engine1"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "password": "cobol59",
            "passwordConfirm": "cobol59",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let reader = session_cookie(&response);

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{slug}/comments"))
        .insert_header((header::COOKIE, reader.clone()))
        .set_json(json!({"content": "Lovely write-up"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{slug}/like"))
        .insert_header((header::COOKIE, reader.clone()))
        .to_request();
    let liked: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(liked, json!({"liked": true, "likeCount": 1}));

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{slug}/view"))
        .to_request();
    let viewed: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(viewed["viewCount"], 1);

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{slug}"))
        .to_request();
    let fetched: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(fetched["metrics"], json!({"views": 1, "likes": 1}));

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/search?q=engine&type=posts")
        .to_request();
    let found: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(found["posts"][0]["slug"], slug);
    assert!(found.get("tags").is_none());

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/stats")
        .to_request();
    let stats: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(stats["overview"]["publishedPosts"], 1);
    assert_eq!(stats["overview"]["totalComments"], 1);
    assert_eq!(stats["overview"]["totalUsers"], 2);
    assert_eq!(stats["popularPosts"][0]["views"], 1);
}

#[actix_web::test]
async fn logout_clears_the_cookie_but_bearer_still_works() {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "engine1",
            "passwordConfirm": "engine1",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let cookie = session_cookie(&response);
    let token = cookie
        .strip_prefix("auth_token=")
        .expect("cookie value")
        .to_owned();

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header((header::COOKIE, cookie))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_cookie(&response), "auth_token=deleted");

    // Tokens are stateless, so the bearer form keeps working until expiry.
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let me: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(me["email"], "ada@example.com");
}

#[rstest]
#[case(6, StatusCode::OK)]
#[case(8, StatusCode::UNAUTHORIZED)]
#[actix_web::test]
async fn sessions_expire_after_a_week(#[case] days: i64, #[case] expected: StatusCode) {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "engine1",
            "passwordConfirm": "engine1",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let cookie = session_cookie(&response);

    harness.clock.advance_seconds(days * 24 * 60 * 60);
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header((header::COOKIE, cookie))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn errors_share_one_envelope() {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/posts/does-not-exist")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "not_found");
    assert!(body["message"].is_string());
    assert_eq!(body["traceId"].as_str().map(str::to_owned), trace_id);
}

//! Integration tests for the full web router.
//!
//! Requests go through [`street_bite_web::app`] with its middleware stack;
//! the vendor service is mocked.

#![allow(clippy::unwrap_used)]

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceExt;

use street_bite_integration_tests::{spawn_backend, test_config, user_json, vendor_json};
use street_bite_web::state::AppState;

/// Mock service with two carts near Manhattan, one far upstate, and one account.
fn backend() -> Router {
    Router::new()
        .route(
            "/vendors",
            get(|| async {
                Json(json!([
                    vendor_json("v1", "Taco Loco", 40.7150, -74.0050),
                    vendor_json("v2", "Dumpling Den", 40.7200, -74.0000),
                    vendor_json("v3", "Adirondack Grill", 44.0, -74.0),
                ]))
            }),
        )
        .route(
            "/users/login",
            post(|body: String| async move {
                if body.contains("correct-horse") {
                    Ok(Json(json!({
                        "token": "tok-123",
                        "user": user_json("u1", "Sarah Johnson", "sarah.j@example.com")
                    })))
                } else {
                    Err((
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Invalid email or password"})),
                    ))
                }
            }),
        )
}

async fn app_with(routes: Router) -> Router {
    let api_url = spawn_backend(routes).await;
    street_bite_web::app(AppState::new(test_config(api_url)))
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

fn page(path: &str, cookie: &str) -> Request<Body> {
    Request::get(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn login_request(password: &str) -> Request<Body> {
    Request::post("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(format!(
            "email=sarah.j%40example.com&password={password}&return_to=%2Fdiscover"
        )))
        .unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_follows_vendor_service() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let failing = Router::new().route(
        "/vendors",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let app = app_with(failing).await;
    let response = app
        .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_discover_with_position_lists_nearby_carts() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(
            Request::get("/discover?lat=40.7128&lng=-74.0060")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Taco Loco"));
    assert!(html.contains("Dumpling Den"));
    assert!(!html.contains("Adirondack Grill"));
}

#[tokio::test]
async fn test_vendor_page_and_missing_vendor() {
    let app = app_with(backend()).await;
    let response = app
        .clone()
        .oneshot(Request::get("/vendor/v1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Taco Loco"));
    assert!(html.contains("Carne Asada Taco"));

    let response = app
        .oneshot(Request::get("/vendor/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(Request::get("/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_failed_login_redirects_back_with_message() {
    let app = app_with(backend()).await;
    let response = app.oneshot(login_request("wrong")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/auth/login?error="));
}

#[tokio::test]
async fn test_successful_login_returns_to_requested_page() {
    let app = app_with(backend()).await;
    let response = app.oneshot(login_request("correct-horse")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/discover");
    assert!(response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_favorite_toggle_without_sign_in_changes_nothing() {
    let app = app_with(backend()).await;
    let response = app
        .oneshot(
            Request::post("/favorites/v1/toggle")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::from("return_to=%2Fvendor%2Fv1"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/vendor/v1");
}

#[tokio::test]
async fn test_revoked_token_is_signed_out_on_next_page() {
    let revoked = backend().route("/users/me", get(|| async { StatusCode::UNAUTHORIZED }));
    let app = app_with(revoked).await;
    let response = app.clone().oneshot(login_request("correct-horse")).await.unwrap();
    let cookie = session_cookie(&response);

    let response = app.oneshot(page("/profile", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_confirmed_token_keeps_session() {
    let accepted = backend().route(
        "/users/me",
        get(|| async { Json(user_json("u1", "Sarah J.", "sarah.j@example.com")) }),
    );
    let app = app_with(accepted).await;
    let response = app.clone().oneshot(login_request("correct-horse")).await.unwrap();
    let cookie = session_cookie(&response);

    for _ in 0..2 {
        let response = app.clone().oneshot(page("/profile", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Sarah J."));
    }
}

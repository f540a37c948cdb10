//! Integration test for vendor registration, from sign-in to the dashboard.
//!
//! One browser session is carried across requests by replaying the session
//! cookie; the vendor service is mocked.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path},
    http::{Request, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use serde_json::json;
use tower::ServiceExt;

use street_bite_integration_tests::{spawn_backend, test_config, user_json};
use street_bite_web::state::AppState;

const BOUNDARY: &str = "street-bite-test-boundary";
const CLIENT_IP: &str = "198.51.100.24";

/// Mock service that remembers registered carts per owner.
fn backend(carts: Arc<Mutex<Vec<String>>>) -> Router {
    let created = Arc::clone(&carts);
    Router::new()
        .route(
            "/users/login",
            post(|| async {
                Json(json!({
                    "token": "tok-123",
                    "user": user_json("u1", "Mike Peterson", "mike.p@example.com")
                }))
            }),
        )
        .route(
            "/users/me",
            get(|| async { Json(user_json("u1", "Mike Peterson", "mike.p@example.com")) }),
        )
        .route(
            "/vendors",
            get(|| async { Json(json!([])) }).post(move |mut multipart: Multipart| {
                let created = Arc::clone(&created);
                async move {
                    let mut business_name = String::new();
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        if field.name() == Some("businessName") {
                            business_name = field.text().await.unwrap();
                        }
                    }
                    created.lock().unwrap().push(business_name.clone());
                    (
                        StatusCode::CREATED,
                        Json(json!({"_id": "v9", "businessName": business_name})),
                    )
                }
            }),
        )
        .route(
            "/vendors/{owner}",
            get(move |Path(owner): Path<String>| {
                let carts = Arc::clone(&carts);
                async move {
                    assert_eq!(owner, "u1");
                    let names = carts.lock().unwrap().clone();
                    let records: Vec<_> = names
                        .into_iter()
                        .map(|name| json!({"businessName": name, "city": "Austin", "state": "TX"}))
                        .collect();
                    Json(json!(records))
                }
            }),
        )
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

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn get_page(path: &str, cookie: &str) -> Request<Body> {
    Request::get(path)
        .header(header::COOKIE, cookie)
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::empty())
        .unwrap()
}

fn step(cookie: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::post("/vendor-register/next")
        .header(header::COOKIE, cookie)
        .header("x-forwarded-for", CLIENT_IP)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_register_cart_and_see_it_on_dashboard() {
    let carts: Arc<Mutex<Vec<String>>> = Arc::default();
    let api_url = spawn_backend(backend(Arc::clone(&carts))).await;
    let app = street_bite_web::app(AppState::new(test_config(api_url)));

    // Sign in
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-forwarded-for", CLIENT_IP)
                .body(Body::from(
                    "email=mike.p%40example.com&password=correct-horse&return_to=%2Fvendor-register",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/vendor-register");
    let cookie = session_cookie(&response);

    // Blank business name stays on the first step with an error
    let response = app
        .clone()
        .oneshot(step(&cookie, &[("businessName", "  "), ("description", "Tacos")]))
        .await
        .unwrap();
    assert_eq!(location(&response), "/vendor-register");
    let html = body_text(
        app.clone()
            .oneshot(get_page("/vendor-register", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Business Info"));
    assert!(html.contains("Business name is required"));

    // Business, menu (no image) and location steps
    for fields in [
        vec![("businessName", "Taco Loco"), ("description", "Street tacos")],
        vec![("menuImage", "")],
        vec![
            ("address", "123 Main St"),
            ("city", "Austin"),
            ("state", "TX"),
            ("zipCode", "78701"),
        ],
    ] {
        let response = app.clone().oneshot(step(&cookie, &fields)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let html = body_text(
        app.clone()
            .oneshot(get_page("/vendor-register", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("agreeToTerms"));
    assert!(html.contains("Taco Loco"));

    // Submit from review
    let response = app
        .clone()
        .oneshot(
            Request::post("/vendor-register/submit")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-forwarded-for", CLIENT_IP)
                .body(Body::from("agreeToTerms=on"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/u1");
    assert_eq!(carts.lock().unwrap().as_slice(), ["Taco Loco"]);

    // The dashboard lists the new cart
    let response = app
        .clone()
        .oneshot(get_page("/dashboard/u1", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Taco Loco"));
    assert!(html.contains("Austin, TX"));

    // The draft is gone: the wizard starts over
    let html = body_text(app.oneshot(get_page("/vendor-register", &cookie)).await.unwrap()).await;
    assert!(html.contains("Business Info"));
    assert!(!html.contains("Taco Loco"));
}

// tests/http_surface_tests.rs
//
// Routing, authentication and request validation. None of these requests
// reach the database.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::*;
use dept_store::services::token_service::{TokenKind, UserClaims};
use dept_store::web::configure_app_routes;
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_web::test]
async fn health_endpoint_responds() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/health").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn protected_routes_require_a_bearer_token() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);

  for (method, uri) in [("GET", "/api/cart"), ("GET", "/api/order"), ("GET", "/api/address"), ("GET", "/api/profile")] {
    let req = test::TestRequest::default()
      .method(method.parse().unwrap())
      .uri(uri)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
  }
}

#[actix_web::test]
async fn tampered_and_refresh_tokens_are_rejected_as_access() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);

  let mut tampered = access_token_for(&state, Uuid::new_v4());
  tampered.push('x');
  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(("Authorization", format!("Bearer {}", tampered)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

  let claims = UserClaims {
    id: Uuid::new_v4(),
    first_name: "Ada".into(),
    last_name: "Lovelace".into(),
    middle_name: None,
    email: "ada@example.com".into(),
  };
  let refresh = state.tokens.issue(TokenKind::Refresh, &claims).unwrap();
  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(("Authorization", format!("Bearer {}", refresh)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn refresh_exchanges_a_refresh_token_for_an_access_token() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);

  let user_id = Uuid::new_v4();
  let claims = UserClaims {
    id: user_id,
    first_name: "Ada".into(),
    last_name: "Lovelace".into(),
    middle_name: None,
    email: "ada@example.com".into(),
  };
  let refresh = state.tokens.issue(TokenKind::Refresh, &claims).unwrap();

  let req = test::TestRequest::post()
    .uri("/api/token/refresh")
    .set_json(json!({ "refresh": refresh }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let access = body["access"].as_str().unwrap();
  let verified = state.tokens.verify(access, TokenKind::Access).unwrap();
  assert_eq!(verified.id, user_id);

  let req = test::TestRequest::post()
    .uri("/api/token/refresh")
    .set_json(json!({ "refresh": access }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn blank_login_credentials_are_an_authentication_failure() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);

  for body in [json!({ "email": "", "password": "secret-pass" }), json!({ "email": "ada@example.com" })] {
    let req = test::TestRequest::post().uri("/api/login").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED, "body: {}", body);
  }
}

#[actix_web::test]
async fn order_requests_are_validated_before_any_storage_access() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);
  let token = access_token_for(&state, Uuid::new_v4());

  let invalid_bodies = [
    json!({ "pickup": true }),
    json!({ "pickup": true, "payment": { "card_number": "", "security_code": "123", "payment_method_name": "visa" } }),
    json!({ "payment": { "card_number": "4111111111111111", "security_code": "123", "payment_method_name": "visa" } }),
    json!({ "pickup": true, "payment": { "card_number": "41111111111111111111", "security_code": "123", "payment_method_name": "visa" } }),
    json!({
      "payment": { "card_number": "4111111111111111", "security_code": "123", "payment_method_name": "visa" },
      "address": { "address_line_1": "1 Main", "address_line_2": "Apt 2", "city": "Springfield", "state": "IL", "zipcode": "62701-1234567" }
    }),
  ];

  for body in invalid_bodies {
    let req = test::TestRequest::post()
      .uri("/api/order")
      .insert_header(("Authorization", format!("Bearer {}", token)))
      .set_json(&body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    let error: Value = test::read_body_json(resp).await;
    assert!(error["error"].is_string());
  }
}

#[actix_web::test]
async fn blank_profile_fields_are_rejected() {
  setup_tracing();
  let state = offline_state();
  let app = app!(state);
  let token = access_token_for(&state, Uuid::new_v4());

  let req = test::TestRequest::put()
    .uri("/api/profile")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({ "first_name": "  " }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

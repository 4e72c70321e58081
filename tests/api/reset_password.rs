use actix_web::http::StatusCode;
use actix_web::{test, App};
use backend::store::AccountStore;
use backend::types::ErrorResponse;
use backend::utils::{RESET_CONFIRMATION_SUBJECT, RESET_LINK_SUBJECT};
use serde_json::json;

use crate::helpers::{token_from_mail, TestApp, FRONTEND_URL};

const EMAIL: &str = "alice@example.com";

#[actix_web::test]
async fn reset_flow_changes_the_password_once() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": EMAIL, "password": "P@ssw0rd!"}))
        .to_request();
    test::call_service(&service, signup).await;

    let request = test::TestRequest::post()
        .uri("/auth/reset-password-request")
        .set_json(json!({"email": EMAIL}))
        .to_request();
    assert_eq!(
        test::call_service(&service, request).await.status(),
        StatusCode::OK
    );

    let mail = app.outbox.last().await.expect("No reset mail sent");
    assert_eq!(mail.to, EMAIL);
    assert_eq!(mail.subject, RESET_LINK_SUBJECT);
    assert!(mail.body.contains(&format!("{FRONTEND_URL}/reset-password?token=")));
    let token = token_from_mail(&mail.body);

    let reset = |password: &str| {
        test::TestRequest::post()
            .uri("/auth/reset-password")
            .set_json(json!({"email": EMAIL, "token": token, "password": password}))
            .to_request()
    };

    let response = test::call_service(&service, reset("NewPass1!")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmation = app.outbox.last().await.unwrap();
    assert_eq!(confirmation.subject, RESET_CONFIRMATION_SUBJECT);

    let stored = app.store.find_by_identifier(EMAIL).await.unwrap().unwrap();
    assert!(stored.reset_token.is_none());

    for (password, expected) in [
        ("P@ssw0rd!", StatusCode::UNAUTHORIZED),
        ("NewPass1!", StatusCode::CREATED),
    ] {
        let login = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": EMAIL, "password": password}))
            .to_request();
        assert_eq!(test::call_service(&service, login).await.status(), expected);
    }

    let replay = test::call_service(&service, reset("Another1!")).await;
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_email_and_wrong_token_get_the_same_answer() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": EMAIL, "password": "P@ssw0rd!"}))
        .to_request();
    test::call_service(&service, signup).await;

    let unknown_request = test::TestRequest::post()
        .uri("/auth/reset-password-request")
        .set_json(json!({"email": "nobody@example.com"}))
        .to_request();
    let wrong_token = test::TestRequest::post()
        .uri("/auth/reset-password")
        .set_json(json!({"email": EMAIL, "token": "00ff", "password": "NewPass1!"}))
        .to_request();
    let unknown_completion = test::TestRequest::post()
        .uri("/auth/reset-password")
        .set_json(json!({"email": "nobody@example.com", "token": "00ff", "password": "NewPass1!"}))
        .to_request();

    let mut outcomes = Vec::new();
    for request in [unknown_request, wrong_token, unknown_completion] {
        let response = test::call_service(&service, request).await;
        let status = response.status();
        let body: ErrorResponse = test::read_body_json(response).await;
        outcomes.push((status, body.error));
    }

    assert_eq!(outcomes[0].0, StatusCode::BAD_REQUEST);
    assert!(outcomes.iter().all(|outcome| *outcome == outcomes[0]));
    assert_eq!(app.outbox.count().await, 0);
}

#[actix_web::test]
async fn undeliverable_reset_mail_is_reported() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": EMAIL, "password": "P@ssw0rd!"}))
        .to_request();
    test::call_service(&service, signup).await;
    app.outbox.fail_deliveries();

    let request = test::TestRequest::post()
        .uri("/auth/reset-password-request")
        .set_json(json!({"email": EMAIL}))
        .to_request();
    let response = test::call_service(&service, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn failed_confirmation_mail_does_not_undo_the_reset() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": EMAIL, "password": "P@ssw0rd!"}))
        .to_request();
    test::call_service(&service, signup).await;

    let request = test::TestRequest::post()
        .uri("/auth/reset-password-request")
        .set_json(json!({"email": EMAIL}))
        .to_request();
    test::call_service(&service, request).await;
    let token = token_from_mail(&app.outbox.last().await.unwrap().body);
    app.outbox.fail_deliveries();

    let request = test::TestRequest::post()
        .uri("/auth/reset-password")
        .set_json(json!({"email": EMAIL, "token": token, "password": "NewPass1!"}))
        .to_request();
    assert_eq!(
        test::call_service(&service, request).await.status(),
        StatusCode::OK
    );

    let login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": EMAIL, "password": "NewPass1!"}))
        .to_request();
    assert_eq!(
        test::call_service(&service, login).await.status(),
        StatusCode::CREATED
    );
}

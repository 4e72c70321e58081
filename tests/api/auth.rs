use actix_web::http::StatusCode;
use actix_web::{test, App};
use backend::store::AccountStore;
use backend::types::{ErrorResponse, Role, SessionUser};
use serde_json::json;

use crate::helpers::{session_cookie, TestApp};

#[actix_web::test]
async fn signup_returns_the_sanitized_user_and_a_session() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let request = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": "alice@example.com", "password": "P@ssw0rd!"}))
        .to_request();
    let response = test::call_service(&service, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response).expect("No session cookie");
    assert!(cookie.http_only().unwrap_or(false));

    let user: SessionUser = test::read_body_json(response).await;
    assert_eq!(user.role, Role::User);

    let stored = app
        .store
        .find_by_identifier("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, user.id);
    assert_eq!(stored.credential().salt().len(), 16);
    assert_eq!(stored.credential().hash().len(), 32);

    let request = test::TestRequest::get()
        .uri("/auth/check")
        .cookie(cookie)
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let checked: SessionUser = test::read_body_json(response).await;
    assert_eq!(checked, user);
}

#[actix_web::test]
async fn signup_rejects_duplicates_and_blank_fields() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let body = json!({"email": "alice@example.com", "password": "P@ssw0rd!"});
    let first = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&body)
        .to_request();
    assert_eq!(
        test::call_service(&service, first).await.status(),
        StatusCode::CREATED
    );

    let cases = [
        (body.clone(), "duplicate e-mail"),
        (json!({"email": "bob@example.com", "password": ""}), "empty password"),
        (json!({"email": "  ", "password": "P@ssw0rd!"}), "blank e-mail"),
    ];
    for (payload, case) in cases {
        let request = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(&payload)
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{case}");
    }
}

#[actix_web::test]
async fn check_without_a_valid_session_is_unauthorized() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let request = test::TestRequest::get().uri("/auth/check").to_request();
    assert_eq!(
        test::call_service(&service, request).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let request = test::TestRequest::get()
        .uri("/auth/check")
        .cookie(actix_web::cookie::Cookie::new("auth_token", "v4.local.forged"))
        .to_request();
    assert_eq!(
        test::call_service(&service, request).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn login_accepts_the_registered_password() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": "alice@example.com", "password": "P@ssw0rd!"}))
        .to_request();
    let registered: SessionUser =
        test::read_body_json(test::call_service(&service, signup).await).await;

    let login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "P@ssw0rd!"}))
        .to_request();
    let response = test::call_service(&service, login).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(session_cookie(&response).is_some());
    let logged_in: SessionUser = test::read_body_json(response).await;
    assert_eq!(logged_in, registered);
}

#[actix_web::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let signup = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"email": "alice@example.com", "password": "P@ssw0rd!"}))
        .to_request();
    test::call_service(&service, signup).await;

    let mut outcomes = Vec::new();
    for payload in [
        json!({"email": "alice@example.com", "password": "wrong"}),
        json!({"email": "nobody@example.com", "password": "P@ssw0rd!"}),
    ] {
        let request = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(&payload)
            .to_request();
        let response = test::call_service(&service, request).await;
        let status = response.status();
        assert!(session_cookie(&response).is_none());
        let body: ErrorResponse = test::read_body_json(response).await;
        outcomes.push((status, body.error));
    }

    assert_eq!(outcomes[0].0, StatusCode::UNAUTHORIZED);
    assert_eq!(outcomes[0], outcomes[1]);
}

#[actix_web::test]
async fn logout_expires_the_session_cookie() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let request = test::TestRequest::get().uri("/auth/logout").to_request();
    let response = test::call_service(&service, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("No removal cookie");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age().map(|age| age.whole_seconds()), Some(0));
}

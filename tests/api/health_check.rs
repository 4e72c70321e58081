use actix_web::{test, App};

use crate::helpers::TestApp;

#[actix_web::test]
async fn health_check_works() {
    let app = TestApp::new();
    let service = test::init_service(App::new().configure(|cfg| app.state.configure(cfg))).await;

    let request = test::TestRequest::get().uri("/health_check/").to_request();
    let response = test::call_service(&service, request).await;

    assert!(response.status().is_success());
}

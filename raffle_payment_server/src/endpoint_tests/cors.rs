use std::time::Duration;

use actix_web::{
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
        Method,
        StatusCode,
    },
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use raffle_payment_engine::SettingsApi;

use super::{
    helpers::{authorization_guard, send_request, TestResponse},
    mocks::{MockRoleManager, MockSettingsManager},
};
use crate::{
    middleware::{ALLOWED_HEADERS, ALLOWED_ORIGIN},
    routes::{health, GetSettingsRoute},
};

fn configure(cfg: &mut ServiceConfig) {
    let mut roles = MockRoleManager::new();
    roles.expect_fetch_roles_for_user().never();
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().never();
    cfg.service(health)
        .service(GetSettingsRoute::<MockRoleManager, MockSettingsManager>::new())
        .app_data(authorization_guard(roles))
        .app_data(web::Data::new(SettingsApi::new(settings, Duration::ZERO)));
}

fn assert_cors_headers(res: &TestResponse) {
    assert_eq!(res.headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), ALLOWED_ORIGIN);
    assert_eq!(res.headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), ALLOWED_HEADERS);
}

#[actix_web::test]
async fn preflight_is_answered_directly() {
    let _ = env_logger::try_init().ok();
    // The admin route would reject this without a token; preflight must never reach it
    for uri in ["/admin/settings", "/datafast-status", "/no-such-route"] {
        let req = TestRequest::default().method(Method::OPTIONS).uri(uri);
        let res = send_request(req, configure).await;
        assert_eq!(res.status, StatusCode::OK, "{uri}");
        assert!(res.body.is_empty());
        assert_cors_headers(&res);
    }
}

#[actix_web::test]
async fn successful_responses_carry_cors_headers() {
    let _ = env_logger::try_init().ok();
    let res = send_request(TestRequest::get().uri("/health"), configure).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_cors_headers(&res);
}

#[actix_web::test]
async fn error_responses_carry_cors_headers() {
    let _ = env_logger::try_init().ok();
    let res = send_request(TestRequest::get().uri("/admin/settings"), configure).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_cors_headers(&res);
    let res = send_request(TestRequest::get().uri("/no-such-route"), configure).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_cors_headers(&res);
}

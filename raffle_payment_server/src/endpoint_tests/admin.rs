use std::time::Duration;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use raffle_payment_engine::{
    db_types::{GatewayMode, MediaRecord, MediaType, Role, StoredPaymentSettings},
    AuthApi,
    AuthApiError,
    MediaApi,
    SettingsApi,
};
use serde_json::json;

use super::{
    helpers::{
        authorization_guard,
        bearer,
        expired_token,
        issue_token,
        role_manager,
        send_request,
        stored_settings,
        timestamp,
        ADMIN_ID,
        USER_ID,
    },
    mocks::{MockMediaManager, MockRoleManager, MockSettingsManager},
};
use crate::routes::{CreateMediaRoute, GetSettingsRoute, UpdateRolesRoute, UpdateSettingsRoute};

fn configure_settings(roles: MockRoleManager, settings: MockSettingsManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(GetSettingsRoute::<MockRoleManager, MockSettingsManager>::new())
            .service(UpdateSettingsRoute::<MockRoleManager, MockSettingsManager>::new())
            .app_data(authorization_guard(roles))
            .app_data(web::Data::new(SettingsApi::new(settings, Duration::ZERO)));
    }
}

fn configure_media(roles: MockRoleManager, media: MockMediaManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(CreateMediaRoute::<MockRoleManager, MockMediaManager>::new())
            .app_data(authorization_guard(roles))
            .app_data(web::Data::new(MediaApi::new(media)));
    }
}

fn untouched_settings() -> MockSettingsManager {
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().never();
    settings.expect_upsert_payment_settings().never();
    settings
}

#[actix_web::test]
async fn no_token() {
    let _ = env_logger::try_init().ok();
    let mut roles = MockRoleManager::new();
    roles.expect_fetch_roles_for_user().never();
    let req = TestRequest::get().uri("/admin/settings");
    let res = send_request(req, configure_settings(roles, untouched_settings())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "Authentication Error. Missing authorization header."}));
}

#[actix_web::test]
async fn bad_tokens() {
    let _ = env_logger::try_init().ok();
    let mut tampered = issue_token(ADMIN_ID);
    tampered.replace_range(tampered.len() - 10..tampered.len() - 5, "AAAAA");
    let headers = [
        ("Authorization", "Bearer not-a-jwt".to_string()),
        ("Authorization", format!("Basic {}", issue_token(ADMIN_ID))),
        ("Authorization", "Bearer".to_string()),
        bearer(&tampered),
        bearer(&expired_token(ADMIN_ID)),
    ];
    for header in headers {
        let mut roles = MockRoleManager::new();
        roles.expect_fetch_roles_for_user().never();
        let req = TestRequest::get().uri("/admin/settings").insert_header(header.clone());
        let res = send_request(req, configure_settings(roles, untouched_settings())).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", header.1);
        assert!(res.json()["error"].as_str().unwrap().starts_with("Authentication Error."));
    }
}

#[actix_web::test]
async fn token_for_another_audience() {
    let _ = env_logger::try_init().ok();
    let mut config = super::helpers::get_auth_config();
    config.audience = "service_role".into();
    let token = crate::auth::TokenAuthenticator::new(&config)
        .issue_token(ADMIN_ID, None, Duration::from_secs(60))
        .expect("Failed to sign token");
    let req = TestRequest::get().uri("/admin/settings").insert_header(bearer(&token));
    let res = send_request(req, configure_settings(MockRoleManager::new(), untouched_settings())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn non_admin_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::put()
        .uri("/admin/settings")
        .insert_header(bearer(&issue_token(USER_ID)))
        .set_json(json!({"datafast_enabled": false}));
    let res = send_request(req, configure_settings(role_manager(), untouched_settings())).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.json()["error"].as_str().unwrap().contains("Insufficient Permissions"));
}

#[actix_web::test]
async fn role_lookup_failure() {
    let _ = env_logger::try_init().ok();
    let mut roles = MockRoleManager::new();
    roles
        .expect_fetch_roles_for_user()
        .returning(|_| Err(AuthApiError::DatabaseError("database is locked".into())));
    let req = TestRequest::get().uri("/admin/settings").insert_header(bearer(&issue_token(ADMIN_ID)));
    let res = send_request(req, configure_settings(roles, untouched_settings())).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn fetch_settings_redacts_the_access_token() {
    let _ = env_logger::try_init().ok();
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().times(1).returning(|| Ok(Some(stored_settings(true))));
    let req = TestRequest::get().uri("/admin/settings").insert_header(bearer(&issue_token(ADMIN_ID)));
    let res = send_request(req, configure_settings(role_manager(), settings)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.body.contains("OGE4Mjk0MTc0YjdlY2IyODAxNGI5Njk5MjIwMDE1Y2N8c3k2S0pzVDg="));
    assert_eq!(
        res.json(),
        json!({
            "datafast": {
                "enabled": true,
                "mode": "TEST",
                "entity_id": "8a8294174b7ecb28014b9699220015ca",
                "access_token": "****"
            },
            "updated_at": "2024-05-01T12:30:00Z"
        })
    );
}

#[actix_web::test]
async fn fetch_settings_before_they_are_configured() {
    let _ = env_logger::try_init().ok();
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().returning(|| Ok(None));
    let req = TestRequest::get().uri("/admin/settings").insert_header(bearer(&issue_token(ADMIN_ID)));
    let res = send_request(req, configure_settings(role_manager(), settings)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["datafast"]["enabled"], json!(false));
    assert_eq!(body["updated_at"], json!(null));
}

#[actix_web::test]
async fn update_settings() {
    let _ = env_logger::try_init().ok();
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().returning(|| Ok(Some(stored_settings(false))));
    settings
        .expect_upsert_payment_settings()
        .withf(|s| s.datafast.enabled && s.datafast.mode == GatewayMode::Prod && !s.datafast.access_token.reveal().is_empty())
        .times(1)
        .returning(|s| {
            Ok(StoredPaymentSettings {
                datafast_enabled: s.datafast.enabled,
                datafast_mode: s.datafast.mode.to_string(),
                datafast_entity_id: s.datafast.entity_id.clone(),
                datafast_access_token: s.datafast.access_token.reveal().clone(),
                updated_at: timestamp(),
            })
        });
    let req = TestRequest::put()
        .uri("/admin/settings")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!({"datafast_enabled": true, "datafast_mode": "PROD"}));
    let res = send_request(req, configure_settings(role_manager(), settings)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["datafast"]["enabled"], json!(true));
    assert_eq!(body["datafast"]["mode"], json!("PROD"));
    assert_eq!(body["datafast"]["access_token"], json!("****"));
}

#[actix_web::test]
async fn invalid_settings_update_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().returning(|| Ok(Some(stored_settings(true))));
    settings.expect_upsert_payment_settings().never();
    let req = TestRequest::put()
        .uri("/admin/settings")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!({"datafast_entity_id": "   "}));
    let res = send_request(req, configure_settings(role_manager(), settings)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "Conversion error: DataFast is enabled, but no entity id is configured"}));
}

#[actix_web::test]
async fn malformed_settings_body() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::put()
        .uri("/admin/settings")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!({"datafast_mode": "LIVE"}));
    let res = send_request(req, configure_settings(role_manager(), untouched_settings())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn currency_is_not_an_admin_setting() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::put()
        .uri("/admin/settings")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!({"currency": "EUR"}));
    let res = send_request(req, configure_settings(role_manager(), untouched_settings())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let error = res.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("unknown field `currency`"), "{error}");
}

#[actix_web::test]
async fn create_media_record() {
    let _ = env_logger::try_init().ok();
    let mut media = MockMediaManager::new();
    media.expect_insert_media_record().withf(|_, created_by| created_by.to_string() == ADMIN_ID).times(1).returning(
        |record, created_by| {
            Ok(MediaRecord {
                id: 12,
                file_name: record.file_name.clone(),
                file_url: record.file_url.clone(),
                file_type: record.file_type,
                instagram_post_url: record.instagram_post_url.clone(),
                created_by: created_by.to_string(),
                created_at: timestamp(),
            })
        },
    );
    let req = TestRequest::post().uri("/admin/media").insert_header(bearer(&issue_token(ADMIN_ID))).set_json(json!({
        "file_name": "  draw-night.jpg ",
        "file_url": "https://cdn.example.com/media/draw-night.jpg",
        "file_type": "image"
    }));
    let res = send_request(req, configure_media(role_manager(), media)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(
        res.json(),
        json!({
            "id": 12,
            "file_name": "draw-night.jpg",
            "file_url": "https://cdn.example.com/media/draw-night.jpg",
            "file_type": "image",
            "instagram_post_url": null,
            "created_by": ADMIN_ID,
            "created_at": "2024-05-01T12:30:00Z"
        })
    );
}

#[actix_web::test]
async fn create_media_record_validation() {
    let _ = env_logger::try_init().ok();
    for body in [
        json!({"file_name": "", "file_url": "https://cdn.example.com/a.jpg", "file_type": "image"}),
        json!({"file_name": "a.jpg", "file_url": "ftp://cdn.example.com/a.jpg", "file_type": "image"}),
    ] {
        let mut media = MockMediaManager::new();
        media.expect_insert_media_record().never();
        let req =
            TestRequest::post().uri("/admin/media").insert_header(bearer(&issue_token(ADMIN_ID))).set_json(&body);
        let res = send_request(req, configure_media(role_manager(), media)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{body}");
    }
    let mut media = MockMediaManager::new();
    media.expect_insert_media_record().never();
    let req = TestRequest::post()
        .uri("/admin/media")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!({"file_name": "a.gif", "file_url": "https://cdn.example.com/a.gif", "file_type": "gif"}));
    let res = send_request(req, configure_media(role_manager(), media)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_media_as_user() {
    let _ = env_logger::try_init().ok();
    let mut media = MockMediaManager::new();
    media.expect_insert_media_record().never();
    let req = TestRequest::post().uri("/admin/media").insert_header(bearer(&issue_token(USER_ID))).set_json(json!({
        "file_name": "a.jpg", "file_url": "https://cdn.example.com/a.jpg", "file_type": MediaType::Image
    }));
    let res = send_request(req, configure_media(role_manager(), media)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn update_roles() {
    let _ = env_logger::try_init().ok();
    let mut roles = role_manager();
    roles
        .expect_assign_roles()
        .withf(|user_id, roles| user_id.to_string() == USER_ID && roles.to_vec() == vec![Role::Admin])
        .times(1)
        .returning(|_, _| Ok(()));
    roles
        .expect_remove_roles()
        .withf(|user_id, roles| user_id.to_string() == USER_ID && roles.is_empty())
        .times(1)
        .returning(|_, _| Ok(0));
    let req = TestRequest::post()
        .uri("/admin/roles")
        .insert_header(bearer(&issue_token(ADMIN_ID)))
        .set_json(json!([{"user_id": USER_ID, "apply": ["admin"]}]));
    // The guard has its own role store, so only the handler's store sees the writes
    let res = send_request(req, move |cfg: &mut ServiceConfig| {
        cfg.service(UpdateRolesRoute::<MockRoleManager, MockRoleManager>::new())
            .app_data(authorization_guard(role_manager()))
            .app_data(web::Data::new(AuthApi::new(roles)));
    })
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.json(), json!({"success": true, "message": "Roles updated."}));
}

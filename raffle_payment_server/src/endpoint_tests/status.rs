use std::time::Duration;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use raffle_payment_engine::{
    db_types::{OrderStatusType, StoredPaymentSettings},
    events::EventProducers,
    GatewayError,
    GatewayStatus,
    PaymentOutcome,
    ReconciliationApi,
    SettingsApi,
};
use serde_json::json;

use super::{
    helpers::{order, send_request, stored_settings},
    mocks::{MockGateway, MockGatewayDb, MockSettingsManager},
};
use crate::routes::DatafastStatusRoute;

const RESOURCE_PATH: &str = "/v1/checkouts/8ac7a4c98f1e2bd6018f2b5f1c3d4e5f/payment";

fn configure(
    db: MockGatewayDb,
    gateway: MockGateway,
    settings: MockSettingsManager,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ReconciliationApi::new(db, gateway, EventProducers::default());
        let settings_api = SettingsApi::new(settings, Duration::ZERO);
        cfg.service(DatafastStatusRoute::<MockGatewayDb, MockGateway, MockSettingsManager>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(settings_api));
    }
}

// A gateway that only accepts paths in the checkout namespace and must never be asked for a status.
fn strict_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_validate_resource_path().returning(|path| {
        if path.starts_with("/v1/checkouts/") && !path.contains("..") {
            Ok(())
        } else {
            Err(GatewayError::InvalidResourcePath(path.to_string()))
        }
    });
    gateway.expect_fetch_status().never();
    gateway
}

fn settings_returning(settings: Option<StoredPaymentSettings>) -> MockSettingsManager {
    let mut mgr = MockSettingsManager::new();
    mgr.expect_fetch_payment_settings().returning(move || Ok(settings.clone()));
    mgr
}

fn untouched_settings() -> MockSettingsManager {
    let mut mgr = MockSettingsManager::new();
    mgr.expect_fetch_payment_settings().never();
    mgr
}

fn success_payload() -> serde_json::Value {
    json!({
        "id": "8ac7a4a18f1e6c3b018f2b6a7c9d0e11",
        "paymentType": "DB",
        "amount": "10.00",
        "currency": "USD",
        "merchantTransactionId": "RFLX2ABCDEF12",
        "result": {"code": "000.100.110", "description": "Request successfully processed in 'Merchant in Integrator Test Mode'"},
        "timestamp": "2024-05-01 12:31:02+0000"
    })
}

#[actix_web::test]
async fn missing_resource_path() {
    let _ = env_logger::try_init().ok();
    for uri in ["/datafast-status", "/datafast-status?resourcePath=", "/datafast-status?resourcePath=%20%20"] {
        let req = TestRequest::get().uri(uri);
        let res = send_request(req, configure(MockGatewayDb::new(), strict_gateway(), untouched_settings())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(res.json(), json!({"error": "Missing resourcePath parameter"}));
    }
}

#[actix_web::test]
async fn invalid_resource_path_never_loads_credentials() {
    let _ = env_logger::try_init().ok();
    for path in [
        "https%3A%2F%2Fattacker.example.com%2Fv1%2Fcheckouts%2Fx%2Fpayment",
        "%2F%2Fattacker.example.com%2Fpayment",
        "%2Fv1%2Fcheckouts%2F..%2F..%2Fadmin",
        "%2Fv2%2Fpayments%2Fabc",
    ] {
        let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={path}"));
        let res = send_request(req, configure(MockGatewayDb::new(), strict_gateway(), untouched_settings())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(res.json(), json!({"error": "Invalid resourcePath parameter"}));
    }
}

#[actix_web::test]
async fn settings_not_configured() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res = send_request(req, configure(MockGatewayDb::new(), strict_gateway(), settings_returning(None))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"error": "Could not load payment settings"}));
}

#[actix_web::test]
async fn malformed_settings() {
    let _ = env_logger::try_init().ok();
    let mut stored = stored_settings(true);
    stored.datafast_mode = "LIVE".into();
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res =
        send_request(req, configure(MockGatewayDb::new(), strict_gateway(), settings_returning(Some(stored)))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"error": "Could not load payment settings"}));
}

#[actix_web::test]
async fn payment_method_disabled() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let settings = settings_returning(Some(stored_settings(false)));
    let res = send_request(req, configure(MockGatewayDb::new(), strict_gateway(), settings)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "DataFast payment method is disabled"}));
}

#[actix_web::test]
async fn gateway_rejection_is_passed_through() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_validate_resource_path().returning(|_| Ok(()));
    gateway.expect_fetch_status().times(1).returning(|_, _| {
        Err(GatewayError::Rejected {
            status: 404,
            body: r#"{"result":{"code":"200.300.404","description":"invalid or missing parameter"}}"#.into(),
        })
    });
    let mut db = MockGatewayDb::new();
    db.expect_fetch_order_by_resource_path().never();
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res = send_request(req, configure(db, gateway, settings_returning(Some(stored_settings(true))))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(
        res.json(),
        json!({
            "error": "DataFast status API error",
            "details": r#"{"result":{"code":"200.300.404","description":"invalid or missing parameter"}}"#
        })
    );
}

#[actix_web::test]
async fn gateway_unreachable() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_validate_resource_path().returning(|_| Ok(()));
    gateway
        .expect_fetch_status()
        .returning(|_, _| Err(GatewayError::Unavailable("error sending request: connection refused".into())));
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res =
        send_request(req, configure(MockGatewayDb::new(), gateway, settings_returning(Some(stored_settings(true)))))
            .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    // Internal detail is logged, not returned
    assert!(!res.body.contains("connection refused"), "{}", res.body);
}

#[actix_web::test]
async fn successful_payment_updates_the_order() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_validate_resource_path().returning(|_| Ok(()));
    gateway.expect_fetch_status().withf(|path, settings| path.to_string() == RESOURCE_PATH && settings.enabled).times(1).returning(
        |_, _| {
            Ok(GatewayStatus {
                code: "000.100.110".into(),
                description: "Request successfully processed".into(),
                outcome: PaymentOutcome::Succeeded,
                payload: success_payload(),
            })
        },
    );
    let mut db = MockGatewayDb::new();
    db.expect_fetch_order_by_resource_path()
        .times(1)
        .returning(|path| Ok(Some(order("RFLX2ABCDEF12", OrderStatusType::AwaitingGateway, Some(path)))));
    db.expect_transition_order_status()
        .withf(|oid, from, to| {
            oid.as_str() == "RFLX2ABCDEF12" && from.contains(&OrderStatusType::AwaitingGateway) && *to == OrderStatusType::Succeeded
        })
        .times(1)
        .returning(|oid, _, to| Ok(Some(order(oid.as_str(), to, Some(RESOURCE_PATH)))));
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res = send_request(req, configure(db, gateway, settings_returning(Some(stored_settings(true))))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), success_payload());
}

#[actix_web::test]
async fn unknown_resource_path_still_reports_status() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_validate_resource_path().returning(|_| Ok(()));
    gateway.expect_fetch_status().returning(|_, _| {
        Ok(GatewayStatus {
            code: "800.100.151".into(),
            description: "transaction declined (invalid card)".into(),
            outcome: PaymentOutcome::Failed,
            payload: json!({"result": {"code": "800.100.151"}}),
        })
    });
    let mut db = MockGatewayDb::new();
    db.expect_fetch_order_by_resource_path().returning(|_| Ok(None));
    db.expect_transition_order_status().never();
    let req = TestRequest::get().uri(&format!("/datafast-status?resourcePath={RESOURCE_PATH}"));
    let res = send_request(req, configure(db, gateway, settings_returning(Some(stored_settings(true))))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"result": {"code": "800.100.151"}}));
}

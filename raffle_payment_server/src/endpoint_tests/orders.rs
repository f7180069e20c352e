use std::time::Duration;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use raffle_payment_engine::{
    db_types::{Order, OrderStatusType},
    events::EventProducers,
    GatewayError,
    GatewaySession,
    InsertOrderResult,
    OrderFlowApi,
    OrderOptions,
    SettingsApi,
};
use serde_json::json;

use super::{
    helpers::{order, send_request, stored_settings, timestamp},
    mocks::{MockGateway, MockGatewayDb, MockSettingsManager},
};
use crate::routes::{CancelOrderRoute, CheckoutRoute, CreateOrderRoute, OrderByIdRoute};

const RESOURCE_PATH: &str = "/v1/checkouts/CHK5E2A.uat01-vm-tx01/payment";

fn configure(db: MockGatewayDb, gateway: MockGateway, settings: MockSettingsManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = OrderFlowApi::new(db, gateway, EventProducers::default(), OrderOptions::default());
        cfg.service(CreateOrderRoute::<MockGatewayDb, MockGateway>::new())
            .service(OrderByIdRoute::<MockGatewayDb, MockGateway>::new())
            .service(CheckoutRoute::<MockGatewayDb, MockGateway, MockSettingsManager>::new())
            .service(CancelOrderRoute::<MockGatewayDb, MockGateway>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(SettingsApi::new(settings, Duration::ZERO)));
    }
}

fn quiet_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_begin_transaction().never();
    gateway.expect_fetch_status().never();
    gateway
}

fn settings(enabled: bool) -> MockSettingsManager {
    let mut settings = MockSettingsManager::new();
    settings.expect_fetch_payment_settings().returning(move || Ok(Some(stored_settings(enabled))));
    settings
}

fn db_with_order(existing: Order) -> MockGatewayDb {
    let mut db = MockGatewayDb::new();
    db.expect_fetch_order_by_order_id().returning(move |_| Ok(Some(existing.clone())));
    db
}

#[actix_web::test]
async fn create_order_computes_the_amount() {
    let _ = env_logger::try_init().ok();
    let mut db = MockGatewayDb::new();
    db.expect_insert_order()
        .withf(|o| o.order_id.as_str().starts_with("RF") && o.quantity == 4 && o.amount.cents() == 1000)
        .times(1)
        .returning(|o| {
            Ok(InsertOrderResult::Inserted(Order {
                id: 1,
                order_id: o.order_id,
                raffle_id: o.raffle_id,
                quantity: o.quantity,
                unit_price: o.unit_price,
                amount: o.amount,
                currency: o.currency,
                status: OrderStatusType::Created,
                gateway_resource_path: None,
                created_at: timestamp(),
                updated_at: timestamp(),
            }))
        });
    // The client-supplied amount is ignored
    let req = TestRequest::post().uri("/orders").set_json(json!({
        "raffle_id": "raffle-2024-05",
        "quantity": 4,
        "unit_price": "2.50",
        "amount": "0.01"
    }));
    let res = send_request(req, configure(db, quiet_gateway(), MockSettingsManager::new())).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["amount"], json!("10.00"));
    assert_eq!(body["currency"], json!("USD"));
    assert_eq!(body["status"], json!("created"));
}

#[actix_web::test]
async fn create_order_validation() {
    let _ = env_logger::try_init().ok();
    for body in [
        json!({"raffle_id": "raffle-2024-05", "quantity": 0, "unit_price": "2.50"}),
        json!({"raffle_id": "raffle-2024-05", "quantity": 2, "unit_price": "-2.50"}),
        json!({"raffle_id": "  ", "quantity": 2, "unit_price": "2.50"}),
        json!({"raffle_id": "raffle-2024-05", "quantity": 2, "unit_price": "2.505"}),
        json!({"raffle_id": "raffle-2024-05", "quantity": "two", "unit_price": "2.50"}),
    ] {
        let mut db = MockGatewayDb::new();
        db.expect_insert_order().never();
        let req = TestRequest::post().uri("/orders").set_json(&body);
        let res = send_request(req, configure(db, quiet_gateway(), MockSettingsManager::new())).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[actix_web::test]
async fn order_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockGatewayDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/orders/RFNOPE");
    let res = send_request(req, configure(db, quiet_gateway(), MockSettingsManager::new())).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout() {
    let _ = env_logger::try_init().ok();
    let mut db = db_with_order(order("RFLX2ABCDEF12", OrderStatusType::Created, None));
    db.expect_attach_gateway_session()
        .withf(|oid, path| oid.as_str() == "RFLX2ABCDEF12" && path.to_string() == RESOURCE_PATH)
        .times(1)
        .returning(|oid, path| Ok(Some(order(oid.as_str(), OrderStatusType::AwaitingGateway, Some(path)))));
    let mut gateway = MockGateway::new();
    gateway.expect_begin_transaction().withf(|o, settings| o.amount.cents() == 1000 && settings.enabled).times(1).returning(
        |_, _| {
            Ok(GatewaySession {
                checkout_id: "CHK5E2A.uat01-vm-tx01".into(),
                resource_path: RESOURCE_PATH.into(),
                widget_script_url: "https://eu-test.oppwa.com/v1/paymentWidgets.js?checkoutId=CHK5E2A.uat01-vm-tx01"
                    .into(),
            })
        },
    );
    let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/checkout");
    let res = send_request(req, configure(db, gateway, settings(true))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let body = res.json();
    assert_eq!(body["order"]["status"], json!("awaiting_gateway"));
    assert_eq!(body["order"]["gateway_resource_path"], json!(RESOURCE_PATH));
    assert_eq!(body["session"]["checkout_id"], json!("CHK5E2A.uat01-vm-tx01"));
}

#[actix_web::test]
async fn checkout_when_disabled() {
    let _ = env_logger::try_init().ok();
    let db = db_with_order(order("RFLX2ABCDEF12", OrderStatusType::Created, None));
    let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/checkout");
    let res = send_request(req, configure(db, quiet_gateway(), settings(false))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "DataFast payment method is disabled"}));
}

#[actix_web::test]
async fn checkout_twice() {
    let _ = env_logger::try_init().ok();
    let db = db_with_order(order("RFLX2ABCDEF12", OrderStatusType::AwaitingGateway, Some(RESOURCE_PATH)));
    let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/checkout");
    let res = send_request(req, configure(db, quiet_gateway(), settings(true))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn checkout_refused_by_gateway_fails_the_order() {
    let _ = env_logger::try_init().ok();
    let mut db = db_with_order(order("RFLX2ABCDEF12", OrderStatusType::Created, None));
    db.expect_attach_gateway_session().never();
    db.expect_transition_order_status()
        .withf(|_, from, to| from.to_vec() == vec![OrderStatusType::Created] && *to == OrderStatusType::Failed)
        .times(1)
        .returning(|oid, _, to| Ok(Some(order(oid.as_str(), to, None))));
    let mut gateway = MockGateway::new();
    gateway
        .expect_begin_transaction()
        .times(1)
        .returning(|_, _| Err(GatewayError::Rejected { status: 400, body: "200.300.404 invalid parameter".into() }));
    let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/checkout");
    let res = send_request(req, configure(db, gateway, settings(true))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn cancel_order() {
    let _ = env_logger::try_init().ok();
    let mut db = db_with_order(order("RFLX2ABCDEF12", OrderStatusType::AwaitingGateway, Some(RESOURCE_PATH)));
    db.expect_transition_order_status()
        .withf(|_, from, to| from.contains(&OrderStatusType::AwaitingGateway) && *to == OrderStatusType::Cancelled)
        .times(1)
        .returning(|oid, _, to| Ok(Some(order(oid.as_str(), to, Some(RESOURCE_PATH)))));
    let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/cancel");
    let res = send_request(req, configure(db, quiet_gateway(), MockSettingsManager::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], json!("cancelled"));
}

#[actix_web::test]
async fn cancel_settled_order_is_a_no_op() {
    let _ = env_logger::try_init().ok();
    for (status, expected) in [(OrderStatusType::Succeeded, "succeeded"), (OrderStatusType::Failed, "failed")] {
        let settled = order("RFLX2ABCDEF12", status, Some(RESOURCE_PATH));
        let mut db = db_with_order(settled.clone());
        db.expect_transition_order_status().never();
        let req = TestRequest::post().uri("/orders/RFLX2ABCDEF12/cancel");
        let res = send_request(req, configure(db, quiet_gateway(), MockSettingsManager::new())).await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["status"], json!(expected));
        assert_eq!(body, serde_json::to_value(&settled).unwrap());
    }
}

use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use raffle_payment_engine::{
    events::{EventHandlers, EventProducers},
    AuthApi,
    MediaApi,
    OrderFlowApi,
    ReconciliationApi,
    SettingsApi,
    SqliteDatabase,
};

use crate::{
    auth::{AuthorizationGuard, TokenAuthenticator},
    config::ServerConfig,
    errors::ServerError,
    integrations::{DataFastGateway, TicketReservationNotifier},
    middleware::CorsMiddlewareFactory,
    reconcile_worker::start_reconcile_worker,
    routes::{
        health,
        CancelOrderRoute,
        CheckoutRoute,
        CreateMediaRoute,
        CreateOrderRoute,
        DatafastStatusRoute,
        GetSettingsRoute,
        MediaRoute,
        OrderByIdRoute,
        ReconcileOrderRoute,
        UpdateRolesRoute,
        UpdateSettingsRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = DataFastGateway::new(config.datafast.clone())?;
    let notifier = TicketReservationNotifier::new(config.ticket_webhook_url.clone(), config.datafast.timeout)?;
    if config.ticket_webhook_url.is_none() {
        warn!("📬️ RPG_TICKET_WEBHOOK_URL is not set. Order events will be logged, but not forwarded");
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, notifier.hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let settings_api = SettingsApi::new(db.clone(), config.settings_cache_ttl);
    match config.reconcile_interval {
        Some(period) => {
            let api = ReconciliationApi::new(db.clone(), gateway.clone(), producers.clone());
            let _worker = start_reconcile_worker(api, settings_api.clone(), period);
        },
        None => info!("🕰️ The reconciliation worker is disabled"),
    }
    let srv = create_server_instance(config, db, gateway, producers, settings_api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: DataFastGateway,
    producers: EventProducers,
    settings_api: SettingsApi<SqliteDatabase>,
) -> Result<Server, ServerError> {
    let tokens = TokenAuthenticator::new(&config.auth);
    let order_options = config.order_options.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone(), producers.clone(), order_options.clone());
        let reconciliation_api = ReconciliationApi::new(db.clone(), gateway.clone(), producers.clone());
        let media_api = MediaApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let guard = AuthorizationGuard::new(tokens.clone(), AuthApi::new(db.clone()));
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rpg::access_log"))
            .wrap(CorsMiddlewareFactory::new())
            .app_data(json_config)
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(settings_api.clone()))
            .app_data(web::Data::new(media_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(guard))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, DataFastGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase, DataFastGateway>::new())
            .service(CheckoutRoute::<SqliteDatabase, DataFastGateway, SqliteDatabase>::new())
            .service(ReconcileOrderRoute::<SqliteDatabase, DataFastGateway, SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase, DataFastGateway>::new())
            .service(DatafastStatusRoute::<SqliteDatabase, DataFastGateway, SqliteDatabase>::new())
            .service(MediaRoute::<SqliteDatabase>::new())
            .service(GetSettingsRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(UpdateSettingsRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(CreateMediaRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(UpdateRolesRoute::<SqliteDatabase, SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

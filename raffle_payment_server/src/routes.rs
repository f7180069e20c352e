//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use raffle_payment_engine::{
    db_types::{NewMediaRecord, OrderId, PaymentSettings, Principal, Role, SettingsUpdate},
    AuthApi,
    MediaApi,
    MediaManagement,
    OrderFlowApi,
    PaymentGatewayClient,
    PaymentGatewayDatabase,
    ReconciliationApi,
    RoleManagement,
    SettingsApi,
    SettingsApiError,
    SettingsManagement,
};

use crate::{
    data_objects::{CheckoutResult, JsonResponse, NewOrderRequest, RoleUpdateRequest, StatusQuery},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    // `R` is the role store behind the authorization guard; `A` is the store the handler works with.
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<R, A>(core::marker::PhantomData<fn() -> (R, A)>);}
        paste::paste! { impl<R, A> [<$name:camel Route>]<R, A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (R, A)>)
            }
        }}
        paste::paste! { impl<R, A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<R, A>
        where
            R: raffle_payment_engine::RoleManagement + 'static,
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::<R>::new(&[$($roles),*]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl PaymentGatewayDatabase, PaymentGatewayClient);
/// Creates a new order in the `created` state. The amount is computed from `quantity` and `unit_price`; an `amount`
/// field in the request body is ignored.
pub async fn create_order<B, G>(
    api: web::Data<OrderFlowApi<B, G>>,
    body: web::Json<NewOrderRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
{
    let NewOrderRequest { raffle_id, quantity, unit_price } = body.into_inner();
    debug!("💻️ POST new order for {quantity} tickets in raffle {raffle_id}");
    let order = api.create_order(&raffle_id, quantity, unit_price).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_id => Get "/orders/{order_id}" impl PaymentGatewayDatabase, PaymentGatewayClient);
pub async fn order_by_id<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
{
    let order_id = OrderId::new(path.into_inner());
    trace!("💻️ GET order {order_id}");
    let order = api.fetch_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(checkout => Post "/orders/{order_id}/checkout" impl PaymentGatewayDatabase, PaymentGatewayClient, SettingsManagement);
/// Opens a gateway transaction for the order and returns the session the client needs to render the payment form.
///
/// A checkout can only be opened once per order. If the gateway cannot open it, the order is marked as failed and the
/// client must start over with a new order.
pub async fn checkout<B, G, S>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
    settings: web::Data<SettingsApi<S>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
    S: SettingsManagement,
{
    let order_id = OrderId::new(path.into_inner());
    debug!("💻️ POST checkout for order {order_id}");
    let settings = settings.payment_settings().await?;
    let (order, session) = api.begin_checkout(&order_id, &settings).await?;
    Ok(HttpResponse::Ok().json(CheckoutResult { order, session }))
}

route!(reconcile_order => Post "/orders/{order_id}/reconcile" impl PaymentGatewayDatabase, PaymentGatewayClient, SettingsManagement);
/// Brings the order up to date with the gateway and returns it. Safe to call as often as the client likes.
pub async fn reconcile_order<B, G, S>(
    path: web::Path<String>,
    api: web::Data<ReconciliationApi<B, G>>,
    settings: web::Data<SettingsApi<S>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
    S: SettingsManagement,
{
    let order_id = OrderId::new(path.into_inner());
    debug!("💻️ POST reconcile order {order_id}");
    let settings = settings.payment_settings().await?;
    let order = api.reconcile(&order_id, &settings).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/{order_id}/cancel" impl PaymentGatewayDatabase, PaymentGatewayClient);
pub async fn cancel_order<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
{
    let order_id = OrderId::new(path.into_inner());
    debug!("💻️ POST cancel order {order_id}");
    let order = api.cancel_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Gateway status  ----------------------------------------------------
route!(datafast_status => Get "/datafast-status" impl PaymentGatewayDatabase, PaymentGatewayClient, SettingsManagement);
/// Status endpoint for the payment widget's redirect.
///
/// Looks up the payment at `resourcePath` on the gateway and returns the gateway's JSON unchanged. If one of our orders
/// owns that resource path, the status is applied to it on the way through.
///
/// Nothing is sent to the gateway unless the resource path is inside the gateway namespace and DataFast is enabled.
pub async fn datafast_status<B, G, S>(
    req: HttpRequest,
    api: web::Data<ReconciliationApi<B, G>>,
    settings: web::Data<SettingsApi<S>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGatewayClient,
    S: SettingsManagement,
{
    let query = web::Query::<StatusQuery>::from_query(req.query_string()).map(|q| q.into_inner()).unwrap_or_default();
    let resource_path =
        query.resource_path.filter(|p| !p.trim().is_empty()).ok_or(ServerError::MissingResourcePath)?;
    api.validate_resource_path(&resource_path).map_err(|e| {
        warn!("💻️ Refusing status request for {resource_path:?}. {e}");
        ServerError::InvalidResourcePath
    })?;
    let settings = settings.payment_settings().await?;
    let (status, order) = api.check_resource_path(&resource_path, &settings).await?;
    match order {
        Some(order) => debug!("💻️ {resource_path} reports {}. Order {} is {}", status.code, order.order_id, order.status),
        None => debug!("💻️ {resource_path} reports {}", status.code),
    }
    Ok(HttpResponse::Ok().json(status.payload))
}

//----------------------------------------------   Media  ----------------------------------------------------
route!(media => Get "/media" impl MediaManagement);
/// Lists the published media records, newest first.
pub async fn media<B: MediaManagement>(api: web::Data<MediaApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET media");
    let records = api.fetch_media_records().await?;
    Ok(HttpResponse::Ok().json(records))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(get_settings => Get "/admin/settings" impl SettingsManagement where requires [Role::Admin]);
/// Returns the current payment settings. The access token is always redacted.
pub async fn get_settings<B: SettingsManagement>(
    principal: web::ReqData<Principal>,
    api: web::Data<SettingsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET payment settings for {}", principal.user_id);
    let settings = match api.payment_settings().await {
        Ok(settings) => settings,
        Err(SettingsApiError::NotConfigured) => PaymentSettings::default(),
        Err(e) => return Err(e.into()),
    };
    Ok(HttpResponse::Ok().json(settings))
}

route!(update_settings => Put "/admin/settings" impl SettingsManagement where requires [Role::Admin]);
/// Applies a partial update to the payment settings. Only the fields present in the body are changed.
pub async fn update_settings<B: SettingsManagement>(
    principal: web::ReqData<Principal>,
    api: web::Data<SettingsApi<B>>,
    body: web::Json<SettingsUpdate>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ {} is updating the payment settings", principal.user_id);
    let settings = api.update_settings(body.into_inner()).await.map_err(|e| match e {
        SettingsApiError::Invalid(reason) => ServerError::ValidationError(reason),
        e => e.into(),
    })?;
    Ok(HttpResponse::Ok().json(settings))
}

route!(create_media => Post "/admin/media" impl MediaManagement where requires [Role::Admin]);
pub async fn create_media<B: MediaManagement>(
    principal: web::ReqData<Principal>,
    api: web::Data<MediaApi<B>>,
    body: web::Json<NewMediaRecord>,
) -> Result<HttpResponse, ServerError> {
    let principal = principal.into_inner();
    debug!("💻️ POST media record from {}", principal.user_id);
    let record = api.create_media_record(&principal, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

route!(update_roles => Post "/admin/roles" impl RoleManagement where requires [Role::Admin]);
pub async fn update_roles<B: RoleManagement>(
    principal: web::ReqData<Principal>,
    api: web::Data<AuthApi<B>>,
    body: web::Json<Vec<RoleUpdateRequest>>,
) -> Result<HttpResponse, ServerError> {
    for acl_request in body.into_inner() {
        let user_id = acl_request.user_id.trim();
        if user_id.is_empty() {
            return Err(ServerError::ValidationError("user_id is required".into()));
        }
        info!("💻️ {} is updating roles for {user_id}", principal.user_id);
        api.assign_roles(user_id, &acl_request.apply).await?;
        api.remove_roles(user_id, &acl_request.revoke).await?;
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("Roles updated.")))
}

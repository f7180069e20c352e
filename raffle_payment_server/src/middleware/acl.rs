//! Access control list middleware for the Raffle Payment Server.
//! This middleware can be placed on any route or service.
//!
//! It reads the bearer token from the `Authorization` header and hands it, together with the roles the route
//! requires, to the [`AuthorizationGuard`] registered as app data. If the guard accepts the caller, the resolved
//! [`Principal`] is stored in the request extensions (handlers pick it up with `web::ReqData<Principal>`) and the
//! request continues. Otherwise the guard's error (401, 403 or 500) is returned and the handler never runs.

use std::{future::Future, marker::PhantomData, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use futures::future::{ok, Ready};
use log::*;
use raffle_payment_engine::{
    db_types::{Principal, Role},
    RoleManagement,
};

use crate::{auth::AuthorizationGuard, errors::ServerError};

pub struct AclMiddlewareFactory<A> {
    required_roles: Vec<Role>,
    _role_manager: PhantomData<fn() -> A>,
}

impl<A> AclMiddlewareFactory<A> {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec(), _role_manager: PhantomData }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for AclMiddlewareFactory<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: RoleManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S, A>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService {
            required_roles: self.required_roles.clone(),
            service: Rc::new(service),
            _role_manager: PhantomData,
        })
    }
}

pub struct AclMiddlewareService<S, A> {
    required_roles: Vec<Role>,
    service: Rc<S>,
    _role_manager: PhantomData<fn() -> A>,
}

impl<S, B, A> Service<ServiceRequest> for AclMiddlewareService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: RoleManagement + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let guard = req.app_data::<web::Data<AuthorizationGuard<A>>>().cloned().ok_or_else(|| {
                error!("🔐️ No authorization guard has been registered. Denying access to {}", req.path());
                ServerError::InitializeError("Authorization is not configured".to_string())
            })?;
            let authorization = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(String::from);
            let principal: Principal = guard.authorize(authorization.as_deref(), &required_roles).await?;
            debug!("🔐️ {} granted access to {}", principal.user_id, req.path());
            req.extensions_mut().insert(principal);
            service.call(req).await
        })
    }
}

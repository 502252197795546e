//! Role checks for individual routes.
//!
//! The authentication middleware places the caller's [`JwtClaims`] in the request extensions. This middleware reads
//! them and only lets the request through if the caller holds every role the route requires. Otherwise a 403 Forbidden
//! response is returned.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorInternalServerError},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::auth::{JwtClaims, Role};

pub struct AclMiddlewareFactory {
    required_roles: Rc<[Role]>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: Rc::from(required_roles) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: Rc::clone(&self.required_roles), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Rc<[Role]>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = Rc::clone(&self.required_roles);
        Box::pin(async move {
            let verdict = match req.extensions().get::<JwtClaims>() {
                None => Err(ErrorInternalServerError("No JWT claims found in request extensions")),
                Some(claims) if claims.has_roles(&required_roles) => Ok(()),
                Some(claims) => {
                    info!("💻️ {} was denied access to {}", claims.user_id, req.path());
                    Err(ErrorForbidden("Insufficient permissions"))
                },
            };
            verdict?;
            service.call(req).await
        })
    }
}

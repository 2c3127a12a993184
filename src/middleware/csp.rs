use crate::core::config::PortalConfig;
use crate::security::nonce::RequestNonce;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::{rc::Rc, sync::Arc};
use uuid::Uuid;

/// Per-request CSP wiring: issues a fresh nonce before the handler runs,
/// exposes it through request extensions, and stamps the matching
/// `Content-Security-Policy` header onto the response.
#[derive(Clone)]
pub struct CspMiddleware {
    config: Arc<PortalConfig>,
}

impl CspMiddleware {
    #[inline]
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> Arc<PortalConfig> {
        self.config.clone()
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CspMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct CspMiddlewareService<S> {
    service: Rc<S>,
    config: Arc<PortalConfig>,
}

impl<S, B> Service<ServiceRequest> for CspMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let request_id = Uuid::new_v4()
                .hyphenated()
                .encode_lower(&mut Uuid::encode_buffer())
                .to_owned();

            let nonce = config.issue_nonce();
            debug!("request {}: issued csp nonce", request_id);
            req.extensions_mut().insert(RequestNonce(nonce.clone()));

            let mut res = service.call(req).await?;

            let policy = config.policy_for(&nonce);
            match policy.header_value() {
                Ok(value) => {
                    res.headers_mut().insert(policy.header_name(), value);
                }
                Err(err) => {
                    warn!("request {}: failed to render csp header: {}", request_id, err);
                }
            }

            Ok(res)
        })
    }
}

#[inline]
pub fn csp_middleware(config: PortalConfig) -> CspMiddleware {
    CspMiddleware::new(config)
}

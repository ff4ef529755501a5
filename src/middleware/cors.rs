//! CORS response headers middleware.

use crate::config::CorsConfig;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue,
    },
};
use std::{
    future::{Ready, ready},
    pin::Pin,
};

/// Stamps the configured `Access-Control-Allow-*` headers on every response
pub struct CorsHeaders {
    config: CorsConfig,
}

impl CorsHeaders {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsHeadersMiddleware {
            service,
            config: self.config.clone(),
        }))
    }
}

pub struct CorsHeadersMiddleware<S> {
    service: S,
    config: CorsConfig,
}

impl<S, B> Service<ServiceRequest> for CorsHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        let config = self.config.clone();

        Box::pin(async move {
            let mut res = fut.await?;
            let headers = res.headers_mut();

            for (name, value) in [
                (ACCESS_CONTROL_ALLOW_ORIGIN, &config.allow_origin),
                (ACCESS_CONTROL_ALLOW_HEADERS, &config.allow_headers),
                (ACCESS_CONTROL_ALLOW_METHODS, &config.allow_methods),
            ] {
                // skip values that are not valid header text
                if let Ok(value) = HeaderValue::from_str(value) {
                    headers.insert(name, value);
                }
            }

            Ok(res)
        })
    }
}

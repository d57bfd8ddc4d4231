use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::LocalBoxFuture;

use crate::{
    auth::{AuthDecision, Gate, PolicyRegistry},
    errors::AppError,
    middleware::RequestId,
};

/// Runs the gate in front of every route. Rejections are answered here and
/// never reach the handlers.
pub struct AuthMiddleware {
    gate: Arc<Gate>,
    policies: Arc<PolicyRegistry>,
}

impl AuthMiddleware {
    pub fn new(gate: Arc<Gate>, policies: Arc<PolicyRegistry>) -> Self {
        Self { gate, policies }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            gate: Arc::clone(&self.gate),
            policies: Arc::clone(&self.policies),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    gate: Arc<Gate>,
    policies: Arc<PolicyRegistry>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = Arc::clone(&self.gate);
        let policies = Arc::clone(&self.policies);

        Box::pin(async move {
            // Resolve against the decoded path the router matches on, not the
            // raw URI, so `/api/%63ategorias` gets the `/api/categorias` rules.
            let policy = policies.resolve(req.method(), req.match_info().as_str());
            let outcome = gate
                .authenticate(req.headers(), req.query_string(), policy)
                .await;

            match outcome {
                Ok(decision) => {
                    log::debug!(
                        "[{}] {} {} granted via {}",
                        RequestId::of(&req),
                        req.method(),
                        req.path(),
                        decision.method()
                    );
                    req.extensions_mut().insert(decision);

                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::info!(
                        "[{}] {} {} rejected: {}",
                        RequestId::of(&req),
                        req.method(),
                        req.path(),
                        err.reason()
                    );
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Extractor for the decision the gate attached to the request.
pub struct RequestAuth(pub AuthDecision);

impl FromRequest for RequestAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let decision = req
            .extensions()
            .get::<AuthDecision>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("No autenticado".to_string()));

        ready(decision.map(RequestAuth))
    }
}

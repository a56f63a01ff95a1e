//! Axum integration utilities.
//!
//! [`AuthorizeLayer`] guards a route with a [`Requirement`]. The authenticated
//! user is read from an [`AuthContext`] request extension inserted by the
//! application's own session or login middleware; a request without one is
//! evaluated as the `guest` role.

use crate::engine::Engine;
use crate::requirement::Requirement;
use crate::types::UserId;
use ::axum::body::Body;
use ::axum::response::{IntoResponse, Response};
use ::http::{Request, StatusCode};
use ::tower::{Layer, Service};
use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Authentication context attached to a request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// Authenticated user, or `None` for an anonymous request.
    pub user: Option<UserId>,
}

impl AuthContext {
    /// Context for an authenticated user.
    pub fn user(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    /// Context for an anonymous request.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Middleware layer that authorizes a request using [`Engine`].
#[derive(Debug)]
pub struct AuthorizeLayer<S, C> {
    engine: Arc<Engine<S, C>>,
    requirements: Arc<[Requirement]>,
}

impl<S, C> Clone for AuthorizeLayer<S, C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            requirements: Arc::clone(&self.requirements),
        }
    }
}

impl<S, C> AuthorizeLayer<S, C> {
    /// Creates a layer enforcing a single requirement.
    pub fn new(engine: Arc<Engine<S, C>>, requirement: impl Into<Requirement>) -> Self {
        Self::chain(engine, vec![requirement.into()])
    }

    /// Creates a layer enforcing every requirement in `requirements`.
    pub fn chain(engine: Arc<Engine<S, C>>, requirements: Vec<Requirement>) -> Self {
        Self {
            engine,
            requirements: requirements.into(),
        }
    }
}

impl<S, C, Inner> Layer<Inner> for AuthorizeLayer<S, C>
where
    S: crate::store::Store,
    C: crate::cache::Cache,
{
    type Service = AuthorizeService<Inner, S, C>;

    fn layer(&self, inner: Inner) -> Self::Service {
        AuthorizeService {
            inner,
            engine: self.engine.clone(),
            requirements: self.requirements.clone(),
        }
    }
}

/// Middleware service that enforces permission checks.
#[derive(Debug)]
pub struct AuthorizeService<Inner, S, C> {
    inner: Inner,
    engine: Arc<Engine<S, C>>,
    requirements: Arc<[Requirement]>,
}

impl<Inner: Clone, S, C> Clone for AuthorizeService<Inner, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            engine: Arc::clone(&self.engine),
            requirements: Arc::clone(&self.requirements),
        }
    }
}

impl<Inner, S, C> Service<Request<Body>> for AuthorizeService<Inner, S, C>
where
    Inner: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    Inner::Future: Send + 'static,
    S: crate::store::Store + 'static,
    C: crate::cache::Cache + 'static,
{
    type Response = Response;
    type Error = Inner::Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let engine = self.engine.clone();
        let requirements = self.requirements.clone();

        Box::pin(async move {
            let user = req
                .extensions()
                .get::<AuthContext>()
                .and_then(|context| context.user.clone());

            match engine.check_requirements(user.as_ref(), &requirements).await {
                Ok(true) => {
                    poll_fn(|cx| inner.poll_ready(cx)).await?;
                    inner.call(req).await
                }
                Ok(false) => Ok((StatusCode::FORBIDDEN, "forbidden").into_response()),
                Err(err) => {
                    tracing::warn!(error = %err, "authorization misconfigured");
                    Ok((StatusCode::INTERNAL_SERVER_ERROR, "auth error").into_response())
                }
            }
        })
    }
}

#[cfg(all(test, feature = "memory-store"))]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use crate::engine::EngineBuilder;
    use crate::memory_store::MemoryStore;
    use crate::types::{PermissionId, RoleId};
    use futures::executor::block_on;
    use tower::{ServiceExt, service_fn};
    use std::convert::Infallible;

    fn perm(value: &str) -> PermissionId {
        PermissionId::try_from(value).unwrap()
    }

    fn role(value: &str) -> RoleId {
        RoleId::try_from(value).unwrap()
    }

    fn alice() -> UserId {
        UserId::try_from("alice").unwrap()
    }

    fn engine() -> Arc<Engine<MemoryStore>> {
        let engine = EngineBuilder::new(MemoryStore::new()).build();
        block_on(async {
            engine.install().await.unwrap();
            engine.register_permission(&perm("view"), "View pages").await.unwrap();
            engine.register_permission(&perm("edit"), "Edit pages").await.unwrap();
            engine.ensure_role(&role("viewer"), Some("Viewer"), &[]).await.unwrap();
            engine.grant_permission(&role("viewer"), &perm("view")).await.unwrap();
            engine.grant_role(&alice(), &role("viewer")).await.unwrap();
        });
        Arc::new(engine)
    }

    fn request(context: Option<AuthContext>) -> Request<Body> {
        let mut req = Request::builder().uri("/").body(Body::empty()).unwrap();
        if let Some(context) = context {
            req.extensions_mut().insert(context);
        }
        req
    }

    fn respond(layer: AuthorizeLayer<MemoryStore, NoCache>, req: Request<Body>) -> StatusCode {
        let inner = service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(StatusCode::OK.into_response())
        });
        block_on(layer.layer(inner).oneshot(req)).unwrap().status()
    }

    #[test]
    fn allowed_request_should_reach_inner_service() {
        let layer = AuthorizeLayer::new(engine(), perm("view"));

        let status = respond(layer, request(Some(AuthContext::user(alice()))));

        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn denied_request_should_be_forbidden() {
        let layer = AuthorizeLayer::new(engine(), perm("edit"));

        let status = respond(layer, request(Some(AuthContext::user(alice()))));

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn unregistered_permission_should_be_server_error() {
        let layer = AuthorizeLayer::new(engine(), perm("delete"));

        let status = respond(layer, request(Some(AuthContext::user(alice()))));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_context_should_be_evaluated_as_guest() {
        let engine = engine();
        let layer = AuthorizeLayer::new(Arc::clone(&engine), perm("view"));

        assert_eq!(respond(layer.clone(), request(None)), StatusCode::FORBIDDEN);
        assert_eq!(
            respond(layer.clone(), request(Some(AuthContext::anonymous()))),
            StatusCode::FORBIDDEN
        );

        block_on(engine.grant_permission(&RoleId::guest(), &perm("view"))).unwrap();

        assert_eq!(respond(layer, request(None)), StatusCode::OK);
    }

    #[test]
    fn chain_should_require_every_requirement() {
        let layer = AuthorizeLayer::chain(
            engine(),
            vec![Requirement::Unrestricted, perm("view").into(), perm("edit").into()],
        );

        let status = respond(layer, request(Some(AuthContext::user(alice()))));

        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

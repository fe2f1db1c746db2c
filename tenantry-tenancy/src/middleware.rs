//! Tenant Middleware
//!
//! A `tower` layer that resolves the active tenant once per request and
//! stores the resulting [`TenantContext`] in the request extensions.

use crate::context::TenantContextResolver;
use crate::request::TenantRequest;
use crate::tenant::{Tenant, TenantContext};
use http::Request;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that attaches a resolved [`TenantContext`] to every request
///
/// Requests always proceed; handlers treat a missing tenant as a normal state.
///
/// ```rust,ignore
/// let layer = TenantLayer::new(Arc::new(resolver));
/// let app = Router::new().route("/", get(handler)).layer(layer);
/// ```
#[derive(Clone)]
pub struct TenantLayer {
    resolver: Arc<TenantContextResolver>,
}

impl TenantLayer {
    pub fn new(resolver: Arc<TenantContextResolver>) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for TenantLayer {
    type Service = TenantService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TenantService {
            inner,
            resolver: Arc::clone(&self.resolver),
        }
    }
}

/// Service produced by [`TenantLayer`]
#[derive(Clone)]
pub struct TenantService<S> {
    inner: S,
    resolver: Arc<TenantContextResolver>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for TenantService<S>
where
    S: Service<Request<ReqBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let resolver = Arc::clone(&self.resolver);

        Box::pin(async move {
            // An outer layer may already have resolved this request.
            let context = req
                .extensions()
                .get::<TenantContext>()
                .cloned()
                .unwrap_or_default();

            let facts = TenantRequest::from_http(&req);
            context.resolve_with(&resolver, &facts).await;
            req.extensions_mut().insert(context);

            inner.call(req).await
        })
    }
}

/// The active tenant stored by [`TenantLayer`]
pub fn get_tenant<B>(request: &Request<B>) -> Option<&Tenant> {
    request
        .extensions()
        .get::<TenantContext>()
        .and_then(TenantContext::tenant)
}

/// Helper to extract tenant ID from request
pub fn get_tenant_id<B>(request: &Request<B>) -> Option<&str> {
    get_tenant(request).map(|t| t.id.as_str())
}

/// Helper to extract tenant name from request
pub fn get_tenant_name<B>(request: &Request<B>) -> Option<&str> {
    get_tenant(request).map(|t| t.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TenantError;
    use crate::resolver::TenantResolver;
    use crate::store::InMemoryTenantStore;
    use async_trait::async_trait;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::{ServiceExt, service_fn};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TenantResolver for CountingResolver {
        async fn resolve(&self, request: &TenantRequest) -> Result<Option<Tenant>, TenantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(request
                .host()
                .filter(|host| host.ends_with(".example.com"))
                .map(|host| Tenant::new(host, "acme")))
        }
    }

    fn layer(store: Arc<InMemoryTenantStore>) -> (TenantLayer, Arc<CountingResolver>) {
        let strategy = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let resolver = TenantContextResolver::new(store, strategy.clone())
            .with_domains(["app.example.com"]);
        (TenantLayer::new(Arc::new(resolver)), strategy)
    }

    fn request(host: &str) -> Request<()> {
        Request::builder()
            .uri("/dashboard")
            .header("host", host)
            .body(())
            .unwrap()
    }

    async fn echo_tenant(req: Request<()>) -> Result<Option<String>, Infallible> {
        Ok(get_tenant_id(&req).map(str::to_string))
    }

    #[tokio::test]
    async fn test_middleware_with_tenant() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("tenants"));
        let (layer, _) = layer(store);
        let service = layer.layer(service_fn(echo_tenant));

        let tenant = service.oneshot(request("acme.example.com")).await.unwrap();
        assert_eq!(tenant.as_deref(), Some("acme.example.com"));
    }

    #[tokio::test]
    async fn test_middleware_app_domain_proceeds_without_tenant() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("tenants"));
        let (layer, strategy) = layer(store);
        let service = layer.layer(service_fn(|req: Request<()>| async move {
            let context = req.extensions().get::<TenantContext>().cloned();
            Ok::<_, Infallible>(context)
        }));

        let context = service.oneshot(request("app.example.com")).await.unwrap();
        let context = context.expect("context is always attached");
        assert!(context.is_resolved());
        assert!(!context.has_tenant());
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_middleware_store_down_proceeds_without_tenant() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("tenants"));
        store.set_available(false);
        let (layer, _) = layer(store);
        let service = layer.layer(service_fn(echo_tenant));

        let tenant = service.oneshot(request("acme.example.com")).await.unwrap();
        assert_eq!(tenant, None);
    }

    #[tokio::test]
    async fn test_stacked_layers_resolve_once() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("tenants"));
        let (layer, strategy) = layer(store);
        let service = layer.clone().layer(layer.layer(service_fn(echo_tenant)));

        let tenant = service.oneshot(request("acme.example.com")).await.unwrap();
        assert_eq!(tenant.as_deref(), Some("acme.example.com"));
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_each_request_gets_a_fresh_context() {
        let store = Arc::new(InMemoryTenantStore::new().with_table("tenants"));
        let (layer, strategy) = layer(store);
        let mut service = layer.layer(service_fn(echo_tenant));

        let first = service
            .ready()
            .await
            .unwrap()
            .call(request("acme.example.com"))
            .await
            .unwrap();
        let second = service
            .ready()
            .await
            .unwrap()
            .call(request("globex.example.com"))
            .await
            .unwrap();

        assert_eq!(first.as_deref(), Some("acme.example.com"));
        assert_eq!(second.as_deref(), Some("globex.example.com"));
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
    }
}

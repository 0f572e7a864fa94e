//! Fetch middleware.
//! Gives every request its own lazily-built fetch wrapper.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::fetch::{FetchConfig, FetchInstallation, Fetcher, InstallError};
use crate::http::request::RequestContext;
use crate::http::response::{apply_pending_cookies, CookieSink};

/// Per-request cache slot for the fetch wrapper.
///
/// Empty until first read; every read after that returns the same `Arc`.
#[derive(Clone)]
pub struct FetchSlot {
    installation: FetchInstallation,
    request: RequestContext,
    cookies: CookieSink,
    cell: Arc<OnceLock<Arc<Fetcher>>>,
}

impl FetchSlot {
    pub fn new(installation: FetchInstallation, request: RequestContext, cookies: CookieSink) -> Self {
        Self {
            installation,
            request,
            cookies,
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// The request's wrapper, built on first call.
    pub fn get(&self) -> Arc<Fetcher> {
        self.cell
            .get_or_init(|| {
                Arc::new(
                    self.installation
                        .build_wrapper(self.request.clone(), self.cookies.clone()),
                )
            })
            .clone()
    }

    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn cookies(&self) -> &CookieSink {
        &self.cookies
    }
}

/// Installs a [`FetchSlot`] and flushes forwarded cookies onto the response.
pub async fn fetch_middleware(
    State(installation): State<FetchInstallation>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let context = RequestContext::from_request(&req, installation.trust_proxy());
    let cookies = CookieSink::new();
    req.extensions_mut()
        .insert(FetchSlot::new(installation, context, cookies.clone()));

    let mut response = next.run(req).await;
    apply_pending_cookies(&mut response, &cookies);
    response
}

impl FetchInstallation {
    /// Wrap `router` with this installation's middleware.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(self.clone(), fetch_middleware))
    }
}

/// Validate `config`, then wrap `router` with the fetch middleware.
pub fn install_on<S>(router: Router<S>, config: FetchConfig) -> Result<Router<S>, InstallError>
where
    S: Clone + Send + Sync + 'static,
{
    let installation = FetchInstallation::install(config)?;
    Ok(installation.apply(router))
}

/// Extractor for the current request's fetch wrapper.
#[derive(Debug, Clone)]
pub struct Fetch(pub Arc<Fetcher>);

impl Deref for Fetch {
    type Target = Fetcher;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Fetch
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<FetchSlot>()
            .map(|slot| Fetch(slot.get()))
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Fetch middleware is not installed",
            ))
    }
}

//! Upstream dispatch and redirect following.
//!
//! # Responsibilities
//! - Normalize the target and enforce the host allowlist before any I/O
//! - Issue one upstream request per hop over plain TCP or TLS, chosen by
//!   the hop URL's scheme
//! - Follow redirects up to the configured budget
//! - Annotate the final response with the hops taken
//!
//! # Design Decisions
//! - Hops are strictly sequential; each is an await point, never a block
//! - Bodies are buffered in full on both sides
//! - Failures are never retried here

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::error::CorsProxyError;
use crate::forwarding::headers::project_headers;
use crate::forwarding::redirect::{next_step, RedirectChain, Step};
use crate::forwarding::target::normalize_target;
use crate::forwarding::types::{InboundRequest, ProxyConfig, ProxyResponse};
use crate::observability::metrics;
use crate::resilience::with_hop_timeout;
use crate::security::access_control::check_allowed_host;
use crate::security::headers::REDIRECT_HEADER_PREFIX;

pub const X_REQUEST_URL: &str = "x-request-url";
pub const X_FINAL_URL: &str = "x-final-url";

/// Client able to reach both `http` and `https` targets.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the shared upstream client.
///
/// The crypto provider is pinned to `ring` rather than taken from the
/// process default, which is ambiguous when more than one is compiled in.
pub fn build_client() -> Result<UpstreamClient, CorsProxyError> {
    let connector = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to configure TLS for upstream client");
            CorsProxyError::new(format!("Failed to configure TLS: {}", e))
        })?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// Response of a single hop, body fully read.
struct HopResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// The forwarding engine. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    config: Arc<ProxyConfig>,
}

impl Forwarder {
    pub fn new(config: ProxyConfig) -> Result<Self, CorsProxyError> {
        Ok(Self::with_client(build_client()?, Arc::new(config)))
    }

    pub fn with_client(client: UpstreamClient, config: Arc<ProxyConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Forward `inbound` to `target`, following redirects.
    pub async fn forward(
        &self,
        target: &str,
        inbound: &InboundRequest,
    ) -> Result<ProxyResponse, CorsProxyError> {
        let url = normalize_target(target)?;
        check_allowed_host(&url, self.config.allowed_hosts.as_deref())?;

        let mut chain = RedirectChain::start(url);
        loop {
            tracing::debug!(
                url = %chain.current(),
                hop = chain.redirects_followed() + 1,
                method = %inbound.method,
                "Dispatching upstream hop"
            );

            let hop = self.dispatch(chain.current(), inbound).await?;
            let location = hop.headers.get(header::LOCATION);

            match next_step(chain, hop.status, location, self.config.max_redirects) {
                Step::Follow(next) => {
                    metrics::record_redirect();
                    chain = next;
                }
                Step::Done(done) => return Ok(finalize(target, done, hop)),
            }
        }
    }

    /// One upstream exchange under the hop deadline.
    async fn dispatch(
        &self,
        url: &Url,
        inbound: &InboundRequest,
    ) -> Result<HopResponse, CorsProxyError> {
        let headers = project_headers(&inbound.headers, &self.config, url)?;

        let mut request = Request::builder()
            .method(inbound.method.clone())
            .uri(to_uri(url)?)
            .body(Body::from(inbound.body.clone()))
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to build upstream request");
                CorsProxyError::new("Failed to build upstream request")
            })?;
        *request.headers_mut() = headers;

        with_hop_timeout(self.config.hop_timeout, async {
            let response = self.client.request(request).await.map_err(|e| {
                let detail = error_chain(&e);
                tracing::warn!(url = %url, error = %detail, "Upstream request failed");
                metrics::record_upstream_error("connect");
                CorsProxyError::bad_gateway(format!("Failed to proxy request: {}", detail))
            })?;

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|e| {
                    let detail = error_chain(&e);
                    tracing::warn!(url = %url, error = %detail, "Upstream body read failed");
                    metrics::record_upstream_error("connect");
                    CorsProxyError::bad_gateway(format!("Failed to proxy request: {}", detail))
                })?;

            Ok::<_, CorsProxyError>(HopResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        })
        .await
    }
}

/// Convert to an absolute-form `Uri`; fragments never go on the wire.
fn to_uri(url: &Url) -> Result<Uri, CorsProxyError> {
    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str()
        .parse::<Uri>()
        .map_err(|_| CorsProxyError::bad_request("Invalid target URL"))
}

/// Attach hop annotations and build the envelope.
fn finalize(target: &str, chain: RedirectChain, hop: HopResponse) -> ProxyResponse {
    let HopResponse {
        status,
        mut headers,
        body,
    } = hop;
    let (final_url, visited) = chain.into_parts();

    for (index, from) in visited.iter().enumerate() {
        let name = format!("{}{}", REDIRECT_HEADER_PREFIX, index + 1);
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::from_str(from.as_str()),
        ) {
            headers.insert(name, value);
        }
    }

    match HeaderValue::from_str(target) {
        Ok(value) => {
            headers.insert(X_REQUEST_URL, value);
        }
        Err(_) => tracing::warn!("Target is not a valid header value, x-request-url omitted"),
    }
    if let Ok(value) = HeaderValue::from_str(final_url.as_str()) {
        headers.insert(X_FINAL_URL, value);
    }

    ProxyResponse {
        status,
        headers,
        body,
        redirect_chain: visited,
    }
}

/// `Display` of an error followed by its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}

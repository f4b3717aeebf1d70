//! Builds the request context and attaches the caller's identity.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use usergate_auth::{CredentialCarrier, RequestContext};
use usergate_core::types::RequestMetadata;

use crate::error::ApiError;
use crate::middleware::log_denial;
use crate::state::AppState;

/// Inserts a [`RequestContext`] into the request extensions.
///
/// In the blocking profile a request carrying an invalid credential is
/// rejected with 401; otherwise the request always proceeds.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let metadata = request_metadata(&request, state.config.server.trust_proxy);
    let jar = CookieJar::from_headers(request.headers());

    let ctx = {
        let carrier = CredentialCarrier {
            cookie: jar.get(state.attacher.cookie_name()).map(|c| c.value()),
            authorization: request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
        };
        state.attacher.attach(RequestContext::new(metadata), &carrier)
    };

    if let Err(err) = state.attacher.enforce(&ctx) {
        log_denial(&ctx, "identity", &err);
        return Err(err.into());
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Collects the transport-independent request description.
pub fn request_metadata(request: &Request, trust_proxy: bool) -> RequestMetadata {
    let headers = request.headers();
    let ip = client_ip(
        headers,
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
        trust_proxy,
    );
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    RequestMetadata::new(
        ip,
        request.method().as_str(),
        request.uri().path(),
        user_agent,
    )
}

/// Resolves the client IP: the first `X-Forwarded-For` hop when the proxy is
/// trusted, then the socket peer, then `"unknown"`.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

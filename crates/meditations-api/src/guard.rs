//! Localhost-only access for the content admin.
//!
//! Requests under `/admin` or `/api/admin` are let through only when the
//! request host (the `Host` header, else the URI authority; port ignored) is
//! `localhost` or `127.0.0.1`. Refused API calls get a 403 JSON body, refused
//! UI paths a redirect to `/`.
//!
//! The `Host` header is chosen by the client. When the server records peer
//! addresses ([`crate::serve`] does), a request from a non-loopback peer is
//! refused whatever its `Host` says. Behind a reverse proxy every peer is the
//! proxy, so the proxy must not forward `/admin` traffic.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::header::HOST,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::error::ApiError;

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn is_admin_api(path: &str) -> bool {
    is_under(path, "/api/admin")
}

/// Whether `path` is guarded.
pub fn is_guarded_path(path: &str) -> bool {
    is_admin_api(path) || is_under(path, "/admin")
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Whether `host` (with or without port) names the local machine.
pub fn is_local_host(host: &str) -> bool {
    let name = strip_port(host.trim());
    name.eq_ignore_ascii_case("localhost") || name == "127.0.0.1"
}

fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().host().map(str::to_string))
}

fn peer_is_remote(req: &Request) -> bool {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .is_some_and(|ConnectInfo(addr)| !addr.ip().is_loopback())
}

/// Middleware enforcing the localhost rule.
pub async fn local_admin_only(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_guarded_path(&path) {
        return next.run(req).await;
    }

    let host = request_host(&req);
    let remote_peer = peer_is_remote(&req);
    if !remote_peer && host.as_deref().is_some_and(is_local_host) {
        return next.run(req).await;
    }

    warn!(path = %path, host = ?host, remote_peer, "Admin access refused for non-local caller");
    if is_admin_api(&path) {
        ApiError::Forbidden.into_response()
    } else {
        Redirect::temporary("/").into_response()
    }
}

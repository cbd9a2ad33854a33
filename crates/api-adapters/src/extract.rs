//! Request extractors: client source address and the trusted admin assertion.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use domains::DomainError;

use crate::error::ApiError;

/// The request's source address as seen through any reverse proxy: the first
/// `x-forwarded-for` entry when present, the peer address otherwise. Feeds
/// the identity hasher; never persisted raw.
#[derive(Debug, Clone)]
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(forwarded) = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
        {
            return Ok(ClientAddr(forwarded.to_string()));
        }
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        Ok(ClientAddr(addr))
    }
}

/// The admin identity asserted by the upstream auth layer via the
/// `x-admin-user` header. This service trusts the assertion; verifying it
/// is the proxy's job. Absent header means the request never went through
/// the auth layer, so it is rejected outright.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-admin-user")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| AdminUser(v.to_string()))
            .ok_or_else(|| {
                ApiError(DomainError::Unauthorized(
                    "admin assertion missing".into(),
                ))
            })
    }
}

use axum::{extract::FromRequestParts, http::request::Parts};

use amani_config::config;
use amani_result::{create_error, Error, Result};

/// Pass-through reporter identity derived from request headers.
///
/// The bearer token is noted for presence only and never verified; the
/// `X-User-Id` value is taken verbatim. Requests are never rejected for
/// missing credentials, so anonymous submissions always go through.
pub struct Reporter {
    /// Client-supplied user identifier, if any
    pub id: Option<String>,
    /// Whether an Authorization header was present
    pub has_credentials: bool,
}

#[async_trait::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Reporter {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Reporter> {
        let has_credentials = parts.headers.contains_key("authorization");
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        if !has_credentials {
            tracing::debug!("accepting request without credentials");
        }

        Ok(Reporter {
            id,
            has_credentials,
        })
    }
}

/// Admin guard backed by the configured bearer token.
///
/// An empty configured token disables admin routes outright.
pub struct Admin;

#[async_trait::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Admin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Admin> {
        let config = config().await;
        if config.api.security.admin_token.is_empty() {
            return Err(create_error!(NotAuthenticated));
        }

        let presented = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| create_error!(NotAuthenticated))?;

        if presented == config.api.security.admin_token {
            Ok(Admin)
        } else {
            Err(create_error!(NotPrivileged))
        }
    }
}

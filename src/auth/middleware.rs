//! Authentication middleware
//!
//! `require_auth` turns a session cookie into [`Claims`] on the request
//! extensions. `require_role` must be layered inside it: it reads those
//! claims, never the cookie, and loads the caller's stored role.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Claims, Identity, SessionCookie, TokenCodec, UserRole};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{Collection, Filter, SharedStore};

/// Issues sessions and authenticates requests
pub struct Authenticator {
    tokens: TokenCodec,
    cookie: SessionCookie,
}

impl Authenticator {
    pub fn new(tokens: TokenCodec, cookie: SessionCookie) -> Self {
        Self { tokens, cookie }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TokenCodec::from_config(&config.auth),
            SessionCookie::new(&config.auth.cookie_name, config.server.environment),
        )
    }

    /// Sign a token for `identity`, returning the `Set-Cookie` value
    pub fn start_session(&self, identity: &Identity) -> Result<String> {
        let token = self.tokens.issue(identity)?;
        Ok(self.cookie.issue(&token))
    }

    /// `Set-Cookie` value ending the session
    pub fn end_session(&self) -> String {
        self.cookie.clear()
    }

    /// Extract and verify the session from request headers
    pub fn extract_claims(&self, headers: &HeaderMap) -> Result<Claims> {
        let token = self.cookie.read(headers).ok_or(Error::Unauthorized)?;
        self.tokens.verify(token)
    }
}

/// Middleware requiring a valid session
pub async fn require_auth(
    State(auth): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let claims = match auth.extract_claims(req.headers()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            return Err(Error::Unauthorized);
        }
    };

    tracing::debug!("Authenticated {}", claims.email());
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Checks the caller's stored role against a required one
#[derive(Clone)]
pub struct RoleGuard {
    store: SharedStore,
    required: UserRole,
}

impl RoleGuard {
    pub fn new(store: SharedStore, required: UserRole) -> Self {
        Self { store, required }
    }

    pub fn admin(store: SharedStore) -> Self {
        Self::new(store, UserRole::Admin)
    }

    pub fn host(store: SharedStore) -> Self {
        Self::new(store, UserRole::Host)
    }

    pub fn required(&self) -> UserRole {
        self.required
    }

    /// Fails closed: no claims, no stored user, or any other role is
    /// unauthorized
    pub async fn check(&self, claims: Option<&Claims>) -> Result<()> {
        let claims = claims.ok_or(Error::Unauthorized)?;
        let user = self
            .store
            .find_one(Collection::Users, &Filter::eq("email", claims.email()))
            .await?
            .ok_or(Error::Unauthorized)?;

        if UserRole::of(&user) != self.required {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }
}

/// Middleware requiring the caller's stored role to match the guard's
pub async fn require_role(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let claims = req.extensions().get::<Claims>().cloned();
    if let Err(e) = guard.check(claims.as_ref()).await {
        if matches!(e, Error::Unauthorized) {
            tracing::warn!(
                "Rejected {} {}: {} role required",
                req.method(),
                req.uri().path(),
                guard.required()
            );
        }
        return Err(e);
    }
    Ok(next.run(req).await)
}

//! Bearer token authentication and role-based authorization.
//!
//! Tokens are issued by the external identity provider and signed with a shared HS256 secret. The server only
//! validates them; it never logs users in. The `sub` claim identifies the principal, whose roles are then looked up in
//! the role table via [`AuthApi`].
use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use raffle_payment_engine::{
    db_types::{Principal, Role},
    AuthApi,
    RoleManagement,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id.
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Validates bearer tokens against the shared secret.
#[derive(Clone)]
pub struct TokenAuthenticator {
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenAuthenticator (aud: {})", self.audience)
    }
}

impl TokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        Self {
            audience: config.audience.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Checks the signature, expiry and audience of the token and returns its claims.
    pub fn authenticate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(data.claims)
    }

    /// Signs a token for `user_id`. The identity provider normally does this; the server only needs it for
    /// operator tooling and tests.
    pub fn issue_token(&self, user_id: &str, email: Option<String>, duration: Duration) -> Result<String, AuthError> {
        let claims = JwtClaims {
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            exp: Utc::now().timestamp() + duration.as_secs() as i64,
            email,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The single gate in front of every privileged operation.
pub struct AuthorizationGuard<A> {
    tokens: TokenAuthenticator,
    roles: AuthApi<A>,
}

impl<A> Debug for AuthorizationGuard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthorizationGuard ({:?})", self.tokens)
    }
}

impl<A> AuthorizationGuard<A>
where A: RoleManagement
{
    pub fn new(tokens: TokenAuthenticator, roles: AuthApi<A>) -> Self {
        Self { tokens, roles }
    }

    /// Resolves the caller from the raw `Authorization` header value and checks that they hold every one of
    /// `required_roles`.
    pub async fn authorize(&self, authorization: Option<&str>, required_roles: &[Role]) -> Result<Principal, ServerError> {
        let header = authorization.ok_or(AuthError::MissingToken)?;
        let token = bearer_token(header)
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))?;
        let claims = self.tokens.authenticate(token).map_err(|e| {
            debug!("🔐️ Rejected access token. {e}");
            e
        })?;
        let roles = self.roles.roles_for_user(&claims.sub).await?;
        let missing = required_roles.iter().filter(|r| !roles.contains(r)).collect::<Vec<_>>();
        if !missing.is_empty() {
            warn!("🔐️ {} tried to access a resource requiring {missing:?}", claims.sub);
            return Err(AuthError::InsufficientPermissions(format!("Missing roles: {missing:?}")).into());
        }
        trace!("🔐️ {} authorized with roles {roles:?}", claims.sub);
        Ok(Principal { user_id: claims.sub, email: claims.email, roles })
    }

    pub async fn require_admin(&self, authorization: Option<&str>) -> Result<Principal, ServerError> {
        self.authorize(authorization, &[Role::Admin]).await
    }
}

use std::time::Duration;

use actix_jwt_auth_middleware::{Authority, FromRequest, TokenSigner};
use actix_web::{error::Error as ActixWebError, Handler};
use log::*;
use serde::{Deserialize, Serialize};
use tari_jwt::{
    jwt_compact::{AlgorithmExt, Header, TimeOptions, Token, UntrustedToken},
    Ristretto256,
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

/// The header the authentication middleware reads access tokens from.
pub const ACCESS_TOKEN_HEADER: &str = "tpg_access_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    /// Business staff. Managers see every order, manage the price list and settings, and receive live notifications.
    Manager,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRequest)]
pub struct JwtClaims {
    pub user_id: String,
    pub roles: Vec<Role>,
}

impl JwtClaims {
    pub fn new(user_id: &str, roles: &[Role]) -> Self {
        Self { user_id: user_id.to_string(), roles: roles.to_vec() }
    }

    pub fn is_manager(&self) -> bool {
        self.roles.contains(&Role::Manager)
    }

    /// True if every role in `required` was granted to this token.
    pub fn has_roles(&self, required: &[Role]) -> bool {
        required.iter().all(|role| self.roles.contains(role))
    }
}

fn build_jwt_signer(jwt_signing_key: Ristretto256SigningKey) -> Result<TokenSigner<JwtClaims, Ristretto256>, ServerError> {
    let header = Header::empty().with_token_type("JWT");
    TokenSigner::new()
        .signing_key(jwt_signing_key)
        .algorithm(Ristretto256)
        .header(header)
        .build()
        .map_err(|e| ServerError::InitializeError(format!("Failed to build token signer. {e}")))
}

pub fn build_wappi_authority(
    auth_config: AuthConfig,
) -> Result<Authority<JwtClaims, Ristretto256, impl Handler<(), Output = Result<(), ActixWebError>>, ()>, ServerError> {
    let AuthConfig { jwt_signing_key, jwt_verification_key } = auth_config;
    let token_signer = build_jwt_signer(jwt_signing_key)?;
    Authority::<JwtClaims, Ristretto256, _, _>::new()
        .refresh_authorizer(|| async { Ok(()) })
        .enable_header_tokens(true)
        .algorithm(Ristretto256)
        .verifying_key(jwt_verification_key)
        .token_signer(Some(token_signer))
        .build()
        .map_err(|e| ServerError::InitializeError(format!("Failed to build authority. {e}")))
}

/// Checks access tokens that arrive outside the authentication middleware, i.e. the `token` query parameter of the
/// websocket upgrade request.
#[derive(Clone)]
pub struct TokenVerifier {
    verifying_key: Ristretto256VerifyingKey,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { verifying_key: config.jwt_verification_key.clone() }
    }

    pub fn verify<S: AsRef<str>>(&self, token: S) -> Result<JwtClaims, AuthError> {
        let untrusted_token =
            UntrustedToken::new(token.as_ref()).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e:?}")))?;
        let token: Token<JwtClaims> = Ristretto256
            .validator(&self.verifying_key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        let claims = token.claims();
        claims.validate_expiration(&TimeOptions::default()).map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        trace!("Access token for {} validated", claims.custom.user_id);
        Ok(claims.custom.clone())
    }
}

pub struct TokenIssuer {
    signer: TokenSigner<JwtClaims, Ristretto256>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        let signer = build_jwt_signer(config.jwt_signing_key.clone())?;
        Ok(Self { signer })
    }

    /// Issue a new access token with the given claims. Tokens last a day unless `duration` says otherwise.
    pub fn issue_token(&self, claims: &JwtClaims, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::from_secs(60 * 60 * 24));
        self.signer.create_signed_token(claims, duration).map_err(|e| AuthError::ValidationError(format!("{e:?}")))
    }
}

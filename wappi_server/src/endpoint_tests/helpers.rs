use actix_jwt_auth_middleware::AuthenticationService;
use actix_web::{
    body::MessageBody,
    http::{Method, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;
use tari_jwt::{
    jwt_compact::{AlgorithmExt, Claims},
    tari_crypto::{
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
        tari_utilities::hex::Hex,
    },
    Ristretto256,
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};

use crate::{
    auth::{build_wappi_authority, JwtClaims, Role, ACCESS_TOKEN_HEADER},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use these keys anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_signing_key: Ristretto256SigningKey(
            RistrettoSecretKey::from_hex("925842e11914fdd0c9a2ab8a38dac9de57b3e392372cde1661b1a84b1d8e430e").unwrap(),
        ),
        jwt_verification_key: Ristretto256VerifyingKey(
            RistrettoPublicKey::from_hex("b4db54f75421a02b0d0056fb7203df23c742b25e41283976bdaa7fe63de1ad23").unwrap(),
        ),
    }
}

pub fn issue_token(claims: JwtClaims, expiry: DateTime<Utc>) -> String {
    let config = get_auth_config();
    let header = tari_jwt::jwt_compact::Header::empty().with_token_type("JWT");
    let signer = Ristretto256 {};
    let mut claims = Claims::<JwtClaims>::new(claims);
    claims.expiration = Some(expiry);
    signer.token(&header, &claims, &config.jwt_signing_key).expect("Failed to sign token")
}

/// A token valid for the next hour.
pub fn token_for(user_id: &str, roles: &[Role]) -> String {
    issue_token(JwtClaims::new(user_id, roles), Utc::now() + Duration::hours(1))
}

pub fn customer_token(user_id: &str) -> String {
    token_for(user_id, &[Role::User])
}

pub fn manager_token() -> String {
    token_for("manager", &[Role::User, Role::Manager])
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(Method::GET, auth_header, path, None::<()>, configure).await
}

pub async fn post_request<T: Serialize>(
    auth_header: &str,
    path: &str,
    body: T,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(Method::POST, auth_header, path, Some(body), configure).await
}

pub async fn patch_request<T: Serialize>(
    auth_header: &str,
    path: &str,
    body: T,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(Method::PATCH, auth_header, path, Some(body), configure).await
}

pub async fn delete_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(Method::DELETE, auth_header, path, None::<()>, configure).await
}

pub async fn send_request<T: Serialize>(
    method: Method,
    auth_header: &str,
    path: &str,
    body: Option<T>,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let mut req = TestRequest::default().method(method).uri(path);
    if let Some(body) = body {
        req = req.set_json(body);
    }
    authenticated_request(req, auth_header, configure).await
}

/// Sends a request through the authentication middleware. Errors raised by middleware (missing tokens, failed role
/// checks) come back as `Err`. Handler errors are ordinary responses.
pub async fn authenticated_request(
    mut req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header((ACCESS_TOKEN_HEADER, auth_header));
    }
    let req = req.to_request();
    let authority = build_wappi_authority(get_auth_config()).expect("Failed to build authority");
    let app = App::new().wrap(AuthenticationService::new(authority)).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// Sends a request to routes that sit outside the authentication middleware.
pub async fn public_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

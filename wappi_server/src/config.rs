use std::{env, io::Write};

use log::*;
use rand::thread_rng;
use serde_json::json;
use tari_jwt::{
    tari_crypto::{
        keys::PublicKey,
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
        tari_utilities::hex::Hex,
    },
    Ristretto256SigningKey,
    Ristretto256VerifyingKey,
};
use tempfile::NamedTempFile;
use wappi_common::{parse_boolean_flag, parse_env_or_default, Secret};

use crate::errors::ServerError;

const DEFAULT_WAPPI_HOST: &str = "127.0.0.1";
const DEFAULT_WAPPI_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/wappi_store.db";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_HUB_BUFFER_SIZE: usize = 256;
const DEFAULT_CLIENT_BUFFER_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Secret<String>,
    /// Base URL of the customer-facing frontend. Claim links point at `{frontend_url}/claim/{token}`.
    pub frontend_url: String,
    pub auth: AuthConfig,
    /// Capacity of the notification hub's command queue.
    pub hub_buffer_size: usize,
    /// Capacity of each websocket client's outbound buffer. Clients that fall this far behind are disconnected.
    pub client_buffer_size: usize,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WAPPI_HOST.to_string(),
            port: DEFAULT_WAPPI_PORT,
            database_url: Secret::new(DEFAULT_DATABASE_URL.to_string()),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            auth: AuthConfig::default(),
            hub_buffer_size: DEFAULT_HUB_BUFFER_SIZE,
            client_buffer_size: DEFAULT_CLIENT_BUFFER_SIZE,
            use_x_forwarded_for: false,
        }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Clone,
    T::Err: std::fmt::Display,
{
    let (value, err) = parse_env_or_default(env::var(name).ok(), default.clone());
    if let Some(e) = err {
        error!("🪛️ {e} [{name}]. Using the default, {default}, instead.");
    }
    value
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("WAPPI_HOST").ok().unwrap_or_else(|| DEFAULT_WAPPI_HOST.into());
        let port = env_or_default("WAPPI_PORT", DEFAULT_WAPPI_PORT);
        let database_url = env::var("WAPPI_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ WAPPI_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let frontend_url = env::var("WAPPI_FRONTEND_URL").ok().unwrap_or_else(|| {
            info!("🪛️ WAPPI_FRONTEND_URL is not set. Claim links will point at {DEFAULT_FRONTEND_URL}.");
            DEFAULT_FRONTEND_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let hub_buffer_size = env_or_default("WAPPI_HUB_BUFFER_SIZE", DEFAULT_HUB_BUFFER_SIZE);
        let client_buffer_size = env_or_default("WAPPI_CLIENT_BUFFER_SIZE", DEFAULT_CLIENT_BUFFER_SIZE);
        let use_x_forwarded_for = parse_boolean_flag(env::var("WAPPI_USE_X_FORWARDED_FOR").ok(), false);
        Self {
            host,
            port,
            database_url: Secret::new(database_url),
            frontend_url,
            auth,
            hub_buffer_size,
            client_buffer_size,
            use_x_forwarded_for,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// This is the secret key used to sign JWTs. It must be in hex format and be a valid Ristretto secret key.
    pub jwt_signing_key: Ristretto256SigningKey,
    /// This is the public key used to verify JWTs. It must be in hex format and be a valid Ristretto public key.
    /// It must be the public key corresponding to the `jwt_signing_key`.
    pub jwt_verification_key: Ristretto256VerifyingKey,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT signing key has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every issued token becomes invalid when the server restarts. 🚨️🚨️🚨️"
        );
        let mut rng = thread_rng();
        let (sk, pk) = RistrettoPublicKey::random_keypair(&mut rng);
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({
                    "jwt_signing_key": sk.to_hex(),
                    "jwt_verification_key": pk.to_hex(),
                })
                .to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT signing key for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the WAPPI_JWT_SIGNING_KEY and \
                         WAPPI_JWT_VERIFICATION_KEY environment variables instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT signing key to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT signing key. ");
            },
        }
        Self { jwt_signing_key: Ristretto256SigningKey(sk), jwt_verification_key: Ristretto256VerifyingKey(pk) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_sk_hex = env::var("WAPPI_JWT_SIGNING_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [WAPPI_JWT_SIGNING_KEY]")))?;
        let jwt_pk_hex = env::var("WAPPI_JWT_VERIFICATION_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [WAPPI_JWT_VERIFICATION_KEY]")))?;
        Self::from_hex(&jwt_sk_hex, &jwt_pk_hex)
    }

    /// Builds the configuration from a hex key pair, checking that the two keys belong together.
    pub fn from_hex(signing_key: &str, verification_key: &str) -> Result<Self, ServerError> {
        let sk = RistrettoSecretKey::from_hex(signing_key)
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid JWT signing key: {e}")))?;
        let expected = RistrettoPublicKey::from_secret_key(&sk);
        let vk = RistrettoPublicKey::from_hex(verification_key)
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid JWT verification key: {e}")))?;
        if vk == expected {
            Ok(Self { jwt_signing_key: Ristretto256SigningKey(sk), jwt_verification_key: Ristretto256VerifyingKey(vk) })
        } else {
            Err(ServerError::ConfigurationError(
                "The verification key does not match the signing key. Check your configuration.".to_string(),
            ))
        }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub client_buffer_size: usize,
    pub use_x_forwarded_for: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { client_buffer_size: config.client_buffer_size, use_x_forwarded_for: config.use_x_forwarded_for }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { client_buffer_size: DEFAULT_CLIENT_BUFFER_SIZE, use_x_forwarded_for: false }
    }
}

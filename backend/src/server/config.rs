//! Environment-driven server configuration.
//!
//! Centralises the environment lookups so they are validated in one place and
//! the rest of the server code works with typed settings.

use std::env;

use actix_web::cookie::Key;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::domain::CheckoutMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.mercadopago.com/";
const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";

/// Errors raised while reading server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed outside debug builds.
    #[error("failed to read session key at {path}: {source}")]
    SessionKey {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Session cookie settings.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
}

/// Validated server settings.
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// PostgreSQL connection string; `None` selects the in-memory stores.
    pub database_url: Option<String>,
    /// Provider access token; `None` selects the fixture gateway in debug builds.
    pub access_token: Option<String>,
    /// Provider API base URL.
    pub provider_base_url: Url,
    /// Public frontend URL used for post-payment redirects.
    pub app_base_url: String,
    /// Public backend URL used to register the webhook, when known.
    pub api_base_url: Option<String>,
    /// Shared secret required on webhook calls, when set.
    pub webhook_token: Option<String>,
    /// Which checkout integration the frontend uses.
    pub checkout_mode: CheckoutMode,
    /// Session cookie settings.
    pub session: SessionSettings,
}

impl ServerConfig {
    /// Read and validate configuration from the process environment.
    ///
    /// Debug builds tolerate missing provider credentials and session keys
    /// so the server can run locally against fixtures; release builds fail
    /// fast instead.
    pub fn from_env() -> Result<Self, ConfigError> {
        let release = !cfg!(debug_assertions);
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());

        // Enrollments must outlive the process; only debug builds may run
        // against the in-memory store.
        let database_url = required_in_release(
            "DATABASE_URL",
            env::var("DATABASE_URL").ok(),
            release,
            "using in-memory stores",
        )?;
        let access_token = required_in_release(
            "MERCADO_PAGO_ACCESS_TOKEN",
            env::var("MERCADO_PAGO_ACCESS_TOKEN").ok(),
            release,
            "using fixture gateway",
        )?;

        let provider_base_url = {
            let raw = env::var("MERCADO_PAGO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_owned());
            Url::parse(&raw).map_err(|_| ConfigError::InvalidEnv {
                name: "MERCADO_PAGO_BASE_URL",
                value: raw,
                expected: "an absolute URL",
            })?
        };

        let app_base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_owned());
        let api_base_url = env::var("API_BASE_URL").ok();
        if api_base_url.is_none() {
            warn!("API_BASE_URL not set; relying on provider-side webhook configuration");
        }

        let webhook_token = env::var("WEBHOOK_BEARER_TOKEN").ok();
        let checkout_mode = checkout_mode_from_env()?;
        let session = session_settings_from_env()?;

        Ok(Self {
            bind_addr,
            database_url,
            access_token,
            provider_base_url,
            app_base_url,
            api_base_url,
            webhook_token,
            checkout_mode,
            session,
        })
    }

    /// Webhook URL registered with the provider, when the public API URL is known.
    pub fn notification_url(&self) -> Option<String> {
        self.api_base_url
            .as_ref()
            .map(|base| format!("{}/api/v1/payments/webhook", base.trim_end_matches('/')))
    }
}

/// Pass a value through, or fail when it is required and absent.
///
/// Release builds refuse to start without their backing services; debug
/// builds log the named fallback and continue.
fn required_in_release(
    name: &'static str,
    value: Option<String>,
    release: bool,
    fallback: &str,
) -> Result<Option<String>, ConfigError> {
    match value {
        Some(value) => Ok(Some(value)),
        None if release => Err(ConfigError::MissingEnv { name }),
        None => {
            warn!("{name} not set; {fallback} (dev only)");
            Ok(None)
        }
    }
}

fn checkout_mode_from_env() -> Result<CheckoutMode, ConfigError> {
    parse_checkout_mode(env::var("CHECKOUT_MODE").ok())
}

fn parse_checkout_mode(value: Option<String>) -> Result<CheckoutMode, ConfigError> {
    match value {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "redirect" => Ok(CheckoutMode::HostedRedirect),
            "widget" => Ok(CheckoutMode::EmbeddedWidget),
            _ => Err(ConfigError::InvalidEnv {
                name: "CHECKOUT_MODE",
                value,
                expected: "redirect|widget",
            }),
        },
        None => Ok(CheckoutMode::HostedRedirect),
    }
}

fn session_settings_from_env() -> Result<SessionSettings, ConfigError> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| DEFAULT_SESSION_KEY_PATH.to_owned());
    let key = match std::fs::read(&key_path) {
        Ok(bytes) => Key::derive_from(&bytes),
        Err(error) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %error, "using temporary session key (dev only)");
                Key::generate()
            } else {
                return Err(ConfigError::SessionKey {
                    path: key_path,
                    source: error,
                });
            }
        }
    };

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    Ok(SessionSettings { key, cookie_secure })
}

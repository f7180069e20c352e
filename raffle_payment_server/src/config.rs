use std::{env, time::Duration};

use datafast_tools::DataFastConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use raffle_payment_engine::{helpers::is_valid_order_id_prefix, OrderOptions};
use rpg_common::{Secret, DEFAULT_CURRENCY_CODE};

use crate::errors::ServerError;

const DEFAULT_RPG_HOST: &str = "127.0.0.1";
const DEFAULT_RPG_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/raffle_payments.db";
const DEFAULT_ORDER_ID_PREFIX: &str = "RF";
const DEFAULT_JWT_AUDIENCE: &str = "authenticated";
const DEFAULT_SETTINGS_CACHE_SECS: u64 = 30;
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The currency and id prefix given to every new order.
    pub order_options: OrderOptions,
    /// Gateway hosts and the outbound request timeout. These never come from the payment settings.
    pub datafast: DataFastConfig,
    /// How long payment settings are served from memory before being reloaded. Zero disables the cache.
    pub settings_cache_ttl: Duration,
    /// How often outstanding orders are reconciled in the background. `None` disables the sweep.
    pub reconcile_interval: Option<Duration>,
    /// Where order events are sent for ticket reservation. Events are only logged when this is not set.
    pub ticket_webhook_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPG_HOST.to_string(),
            port: DEFAULT_RPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            order_options: OrderOptions::default(),
            datafast: DataFastConfig::default(),
            settings_cache_ttl: Duration::from_secs(DEFAULT_SETTINGS_CACHE_SECS),
            reconcile_interval: Some(Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECS)),
            ticket_webhook_url: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RPG_HOST").ok().unwrap_or_else(|| DEFAULT_RPG_HOST.into());
        let port = env::var("RPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RPG_PORT. {e} Using the default, {DEFAULT_RPG_PORT}, instead."
                    );
                    DEFAULT_RPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RPG_PORT);
        let database_url = env::var("RPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ RPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let order_options = configure_order_options();
        let datafast = DataFastConfig::new_from_env_or_default();
        let settings_cache_ttl =
            Duration::from_secs(seconds_from_env("RPG_SETTINGS_CACHE_SECS", DEFAULT_SETTINGS_CACHE_SECS));
        let reconcile_interval =
            match seconds_from_env("RPG_RECONCILE_INTERVAL_SECS", DEFAULT_RECONCILE_INTERVAL_SECS) {
                0 => {
                    info!("🪛️ Background reconciliation is disabled.");
                    None
                },
                n => Some(Duration::from_secs(n)),
            };
        let ticket_webhook_url = env::var("RPG_TICKET_WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty());
        if ticket_webhook_url.is_none() {
            warn!(
                "🪛️ RPG_TICKET_WEBHOOK_URL is not set. Order events will only be logged, and tickets will not be \
                 reserved automatically."
            );
        }
        Self {
            host,
            port,
            database_url,
            auth,
            order_options,
            datafast,
            settings_cache_ttl,
            reconcile_interval,
            ticket_webhook_url,
        }
    }
}

fn configure_order_options() -> OrderOptions {
    let currency = env::var("RPG_CURRENCY")
        .ok()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| {
            let valid = s.len() == 3 && s.chars().all(|c| c.is_ascii_uppercase());
            if !valid {
                warn!("🪛️ Ignoring invalid currency code in RPG_CURRENCY: {s}");
            }
            valid
        })
        .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
    let order_id_prefix = env::var("RPG_ORDER_ID_PREFIX")
        .ok()
        .filter(|s| {
            let valid = is_valid_order_id_prefix(s);
            if !valid {
                warn!("🪛️ Ignoring invalid order id prefix in RPG_ORDER_ID_PREFIX: {s}");
            }
            valid
        })
        .unwrap_or_else(|| DEFAULT_ORDER_ID_PREFIX.to_string());
    OrderOptions { currency, order_id_prefix }
}

fn seconds_from_env(name: &str, default: u64) -> u64 {
    env::var(name)
        .map_err(|_| info!("🪛️ {name} is not set. Using the default value of {default}s."))
        .and_then(|s| s.trim().parse::<u64>().map_err(|e| warn!("🪛️ Invalid configuration value for {name}. {e}")))
        .ok()
        .unwrap_or(default)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the identity provider that issues the bearer tokens.
    pub jwt_secret: Secret<String>,
    /// Tokens must carry this value in their `aud` claim.
    pub audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No token issued by \
             your identity provider will be accepted, so the admin endpoints are unreachable. Set RPG_JWT_SECRET. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), audience: DEFAULT_JWT_AUDIENCE.to_string() }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("RPG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [RPG_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("RPG_JWT_SECRET is empty".to_string()));
        }
        let audience = env::var("RPG_JWT_AUDIENCE").ok().unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string());
        Ok(Self { jwt_secret: Secret::new(secret), audience })
    }
}

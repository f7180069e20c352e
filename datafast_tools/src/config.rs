use std::{fmt::Display, str::FromStr, time::Duration};

use log::*;
use rpg_common::Secret;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEST_URL: &str = "https://eu-test.oppwa.com";
pub const DEFAULT_PROD_URL: &str = "https://eu-prod.oppwa.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The gateway environment. Selected from server-held payment settings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[serde(rename = "TEST")]
    Test,
    #[serde(rename = "PROD")]
    Production,
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "TEST"),
            Environment::Production => write!(f, "PROD"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEST" => Ok(Self::Test),
            "PROD" => Ok(Self::Production),
            s => Err(format!("Unknown gateway mode: {s}")),
        }
    }
}

/// Per-request credentials, taken from the payment settings.
#[derive(Debug, Clone)]
pub struct DataFastCredentials {
    pub environment: Environment,
    pub entity_id: String,
    pub access_token: Secret<String>,
}

/// Static client configuration. The base URLs are only ever read from the server environment.
#[derive(Debug, Clone)]
pub struct DataFastConfig {
    pub test_url: String,
    pub prod_url: String,
    pub timeout: Duration,
}

impl Default for DataFastConfig {
    fn default() -> Self {
        Self { test_url: DEFAULT_TEST_URL.to_string(), prod_url: DEFAULT_PROD_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

impl DataFastConfig {
    pub fn new_from_env_or_default() -> Self {
        let test_url = std::env::var("RPG_DATAFAST_TEST_URL").unwrap_or_else(|_| {
            debug!("RPG_DATAFAST_TEST_URL not set, using {DEFAULT_TEST_URL}");
            DEFAULT_TEST_URL.to_string()
        });
        let prod_url = std::env::var("RPG_DATAFAST_PROD_URL").unwrap_or_else(|_| {
            debug!("RPG_DATAFAST_PROD_URL not set, using {DEFAULT_PROD_URL}");
            DEFAULT_PROD_URL.to_string()
        });
        let timeout = std::env::var("RPG_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for RPG_GATEWAY_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { test_url: trim_url(test_url), prod_url: trim_url(prod_url), timeout }
    }

    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Test => self.test_url.as_str(),
            Environment::Production => self.prod_url.as_str(),
        }
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

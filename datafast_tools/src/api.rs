use std::sync::Arc;

use log::*;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, Response, Url};
use serde_json::Value;

use crate::{
    config::{DataFastConfig, DataFastCredentials, Environment},
    data_objects::{CheckoutRequest, CheckoutResponse, StatusResponse},
    helpers::validate_resource_path,
    DataFastApiError,
};

#[derive(Clone)]
pub struct DataFastApi {
    config: DataFastConfig,
    client: Arc<Client>,
}

impl DataFastApi {
    pub fn new(config: DataFastConfig) -> Result<Self, DataFastApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataFastApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &DataFastConfig {
        &self.config
    }

    pub fn url(&self, environment: Environment, path: &str) -> String {
        format!("{}{path}", self.config.base_url(environment))
    }

    /// The script the storefront embeds to render the payment form for a checkout.
    pub fn widget_script_url(&self, environment: Environment, checkout_id: &str) -> Result<String, DataFastApiError> {
        let script = self.url(environment, "/v1/paymentWidgets.js");
        let url = Url::parse_with_params(&script, &[("checkoutId", checkout_id)])
            .map_err(|e| DataFastApiError::Initialization(format!("Invalid gateway URL {script}. {e}")))?;
        Ok(url.to_string())
    }

    /// Opens a new checkout on the gateway.
    ///
    /// This call is NOT idempotent. Each successful call creates a new checkout on the gateway, so it must never be
    /// retried automatically.
    pub async fn begin_checkout(
        &self,
        credentials: &DataFastCredentials,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, DataFastApiError> {
        let url = self.url(credentials.environment, "/v1/checkouts");
        let mut fields = request.form_fields(&credentials.entity_id);
        if credentials.environment == Environment::Test {
            fields.push(("testMode", "EXTERNAL".to_string()));
        }
        debug!(
            "💳️ Opening checkout for {} ({} {}) at {url}",
            request.merchant_transaction_id, request.amount, request.currency
        );
        let req = self.authorized(self.client.post(&url), credentials).form(&fields);
        let response = send(req, &url).await?;
        let value = json_body(response).await?;
        let checkout = serde_json::from_value::<CheckoutResponse>(value)
            .map_err(|e| DataFastApiError::JsonError(format!("Unexpected checkout response. {e}")))?;
        info!(
            "💳️ Checkout {} opened for {}. Result: {} {}",
            checkout.id, request.merchant_transaction_id, checkout.result.code, checkout.result.description
        );
        Ok(checkout)
    }

    /// Queries the gateway for the status of the payment identified by `resource_path`.
    ///
    /// The path is validated before anything is sent: the bearer credential is only ever sent to the configured
    /// gateway host.
    pub async fn fetch_status(
        &self,
        credentials: &DataFastCredentials,
        resource_path: &str,
    ) -> Result<StatusResponse, DataFastApiError> {
        let resource_path = validate_resource_path(resource_path)?;
        let url = self.url(credentials.environment, resource_path);
        trace!("💳️ Fetching payment status from {url}");
        let req = self
            .authorized(self.client.get(&url), credentials)
            .query(&[("entityId", credentials.entity_id.as_str())]);
        let response = send(req, &url).await?;
        let value = json_body(response).await?;
        let status = StatusResponse::from_value(value)?;
        debug!("💳️ Status for {resource_path}: {} {}", status.result.code, status.result.description);
        Ok(status)
    }

    fn authorized(&self, req: RequestBuilder, credentials: &DataFastCredentials) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("Bearer {}", credentials.access_token.reveal()))
    }
}

async fn send(req: RequestBuilder, url: &str) -> Result<Response, DataFastApiError> {
    let response = req.send().await.map_err(|e| {
        let reason = if e.is_timeout() { "request timed out".to_string() } else { e.to_string() };
        warn!("💳️ Gateway request to {url} failed. {reason}");
        DataFastApiError::Unavailable(reason)
    })?;
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| DataFastApiError::Unavailable(e.to_string()))?;
    warn!("💳️ Gateway request to {url} returned {status}. {body}");
    Err(DataFastApiError::Rejected { status, body })
}

async fn json_body(response: Response) -> Result<Value, DataFastApiError> {
    response.json::<Value>().await.map_err(|e| DataFastApiError::JsonError(e.to_string()))
}

//! Bridges [`datafast_tools::DataFastApi`] into the engine's [`PaymentGatewayClient`] seam.
use datafast_tools::{
    checkout_resource_path,
    classify_result_code,
    validate_checkout_id,
    validate_resource_path,
    CheckoutRequest,
    DataFastApi,
    DataFastApiError,
    DataFastConfig,
    DataFastCredentials,
    Environment,
    ResultCategory,
};
use log::*;
use raffle_payment_engine::{
    db_types::{GatewayMode, GatewaySettings, Order},
    GatewayError,
    GatewaySession,
    GatewayStatus,
    PaymentGatewayClient,
    PaymentOutcome,
};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct DataFastGateway {
    api: DataFastApi,
}

impl DataFastGateway {
    pub fn new(config: DataFastConfig) -> Result<Self, ServerError> {
        let api = DataFastApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn credentials(settings: &GatewaySettings) -> DataFastCredentials {
    let environment = match settings.mode {
        GatewayMode::Test => Environment::Test,
        GatewayMode::Prod => Environment::Production,
    };
    DataFastCredentials {
        environment,
        entity_id: settings.entity_id.clone(),
        access_token: settings.access_token.clone(),
    }
}

fn outcome_for(category: ResultCategory) -> PaymentOutcome {
    match category {
        ResultCategory::Success => PaymentOutcome::Succeeded,
        ResultCategory::SuccessNeedsReview => PaymentOutcome::SucceededNeedsReview,
        ResultCategory::Pending => PaymentOutcome::Pending,
        ResultCategory::Rejected => PaymentOutcome::Failed,
        ResultCategory::Unknown => PaymentOutcome::Unknown,
    }
}

fn gateway_error(e: DataFastApiError) -> GatewayError {
    match e {
        DataFastApiError::Initialization(s) => GatewayError::Unavailable(s),
        DataFastApiError::InvalidResourcePath(s) => GatewayError::InvalidResourcePath(s),
        DataFastApiError::Unavailable(s) => GatewayError::Unavailable(s),
        DataFastApiError::Rejected { status, body } => GatewayError::Rejected { status, body },
        DataFastApiError::JsonError(s) => GatewayError::InvalidResponse(s),
    }
}

impl PaymentGatewayClient for DataFastGateway {
    fn validate_resource_path(&self, resource_path: &str) -> Result<(), GatewayError> {
        validate_resource_path(resource_path).map(|_| ()).map_err(gateway_error)
    }

    async fn begin_transaction(
        &self,
        order: &Order,
        settings: &GatewaySettings,
    ) -> Result<GatewaySession, GatewayError> {
        let credentials = credentials(settings);
        let request = CheckoutRequest {
            merchant_transaction_id: order.order_id.as_str().to_string(),
            amount: order.amount,
            currency: order.currency.clone(),
        };
        let checkout = self.api.begin_checkout(&credentials, &request).await.map_err(gateway_error)?;
        if classify_result_code(&checkout.result.code) == ResultCategory::Rejected {
            warn!(
                "💳️ The gateway refused to open a checkout for order {}. {} {}",
                order.order_id, checkout.result.code, checkout.result.description
            );
            return Err(GatewayError::Rejected {
                status: 200,
                body: format!("{} {}", checkout.result.code, checkout.result.description),
            });
        }
        let checkout_id = validate_checkout_id(&checkout.id).map_err(gateway_error)?;
        let session = GatewaySession {
            resource_path: checkout_resource_path(checkout_id),
            widget_script_url: self
                .api
                .widget_script_url(credentials.environment, checkout_id)
                .map_err(gateway_error)?,
            checkout_id: checkout_id.to_string(),
        };
        Ok(session)
    }

    async fn fetch_status(
        &self,
        resource_path: &str,
        settings: &GatewaySettings,
    ) -> Result<GatewayStatus, GatewayError> {
        let credentials = credentials(settings);
        let status = self.api.fetch_status(&credentials, resource_path).await.map_err(gateway_error)?;
        let outcome = outcome_for(classify_result_code(&status.result.code));
        Ok(GatewayStatus {
            code: status.result.code,
            description: status.result.description,
            outcome,
            payload: status.payload,
        })
    }
}

use rpg_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DataFastApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// What the server asks the gateway to charge.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Our order id, sent as `merchantTransactionId` so the gateway's records can be matched against ours.
    pub merchant_transaction_id: String,
    pub amount: Money,
    pub currency: String,
}

impl CheckoutRequest {
    pub fn form_fields(&self, entity_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("entityId", entity_id.to_string()),
            ("amount", self.amount.to_string()),
            ("currency", self.currency.clone()),
            ("paymentType", "DB".to_string()),
            ("merchantTransactionId", self.merchant_transaction_id.clone()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    pub id: String,
    pub result: ResultInfo,
    #[serde(default)]
    pub ndc: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The decoded payload of a status query. The full JSON document is kept in `payload` so that it can be passed
/// through to the client unchanged.
#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub result: ResultInfo,
    pub id: Option<String>,
    pub merchant_transaction_id: Option<String>,
    pub payload: Value,
}

impl StatusResponse {
    pub fn from_value(payload: Value) -> Result<Self, DataFastApiError> {
        let result = serde_json::from_value::<ResultInfo>(payload["result"].clone())
            .map_err(|e| DataFastApiError::JsonError(format!("Status payload has no usable result block. {e}")))?;
        let id = payload["id"].as_str().map(String::from);
        let merchant_transaction_id = payload["merchantTransactionId"].as_str().map(String::from);
        Ok(Self { result, id, merchant_transaction_id, payload })
    }
}

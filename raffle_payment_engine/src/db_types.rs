use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rpg_common::{Money, Secret};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle of an order.
///
/// ```text
/// created --checkout opened--> awaiting_gateway --success--> succeeded
///                              awaiting_gateway --failure--> failed
///                              awaiting_gateway --pending--> pending --success|failure--> succeeded|failed
/// any non-terminal state --cancel--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been recorded, but no gateway transaction exists yet.
    Created,
    /// A checkout has been opened with the gateway and we are waiting for the shopper to complete it.
    AwaitingGateway,
    /// The gateway reported that the payment is still in progress.
    Pending,
    /// The gateway confirmed the payment. Terminal.
    Succeeded,
    /// The gateway rejected the payment, or the transaction could not be opened. Terminal.
    Failed,
    /// The shopper cancelled the order. Terminal.
    Cancelled,
}

impl OrderStatusType {
    pub const NON_TERMINAL: &'static [OrderStatusType] =
        &[OrderStatusType::Created, OrderStatusType::AwaitingGateway, OrderStatusType::Pending];
    /// States from which a gateway result can be applied. `Created` is excluded: such orders have no resource path.
    pub const AWAITING_RESULT: &'static [OrderStatusType] =
        &[OrderStatusType::AwaitingGateway, OrderStatusType::Pending];
    pub const AWAITING_GATEWAY: &'static [OrderStatusType] = &[OrderStatusType::AwaitingGateway];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AwaitingGateway => "awaiting_gateway",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "awaiting_gateway" => Ok(Self::AwaitingGateway),
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// A validated order, ready to be persisted. Construct it via [`crate::OrderFlowApi::create_order`], which computes
/// the amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub raffle_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------          Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub raffle_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub amount: Money,
    pub currency: String,
    pub status: OrderStatusType,
    pub gateway_resource_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------          Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

pub type Roles = Vec<Role>;

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       Principal       ---------------------------------------------------------
/// An authenticated identity, as resolved from a bearer token and the role table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub email: Option<String>,
    pub roles: Roles,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

//--------------------------------------    PaymentSettings    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayMode {
    #[serde(rename = "TEST")]
    Test,
    #[serde(rename = "PROD")]
    Prod,
}

impl Display for GatewayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayMode::Test => write!(f, "TEST"),
            GatewayMode::Prod => write!(f, "PROD"),
        }
    }
}

impl FromStr for GatewayMode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEST" => Ok(Self::Test),
            "PROD" => Ok(Self::Prod),
            s => Err(ConversionError(format!("Invalid gateway mode: {s}. Expected TEST or PROD"))),
        }
    }
}

/// Configuration of a single gateway integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub mode: GatewayMode,
    pub entity_id: String,
    pub access_token: Secret<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self { enabled: false, mode: GatewayMode::Test, entity_id: String::default(), access_token: Secret::default() }
    }
}

/// The validated payment configuration. Only ever produced by converting a [`StoredPaymentSettings`] row or by
/// applying a [`SettingsUpdate`], both of which validate.
///
/// There is no currency here. Orders are priced in the single currency the server is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSettings {
    pub datafast: GatewaySettings,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self { datafast: GatewaySettings::default(), updated_at: None }
    }
}

impl PaymentSettings {
    pub fn validate(&self) -> Result<(), ConversionError> {
        let gw = &self.datafast;
        if gw.enabled && gw.entity_id.trim().is_empty() {
            return Err(ConversionError("DataFast is enabled, but no entity id is configured".into()));
        }
        if gw.enabled && gw.access_token.reveal().trim().is_empty() {
            return Err(ConversionError("DataFast is enabled, but no access token is configured".into()));
        }
        Ok(())
    }

    /// Applies a partial update and validates the result.
    pub fn apply(&self, update: SettingsUpdate) -> Result<Self, ConversionError> {
        let mut result = self.clone();
        if let Some(enabled) = update.datafast_enabled {
            result.datafast.enabled = enabled;
        }
        if let Some(mode) = update.datafast_mode {
            result.datafast.mode = mode;
        }
        if let Some(entity_id) = update.datafast_entity_id {
            result.datafast.entity_id = entity_id.trim().to_string();
        }
        if let Some(token) = update.datafast_access_token {
            result.datafast.access_token = Secret::new(token.reveal().trim().to_string());
        }
        result.validate()?;
        Ok(result)
    }
}

/// The raw settings row, exactly as it is stored.
#[derive(Debug, Clone, FromRow)]
pub struct StoredPaymentSettings {
    pub datafast_enabled: bool,
    pub datafast_mode: String,
    pub datafast_entity_id: String,
    pub datafast_access_token: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StoredPaymentSettings> for PaymentSettings {
    type Error = ConversionError;

    fn try_from(row: StoredPaymentSettings) -> Result<Self, Self::Error> {
        let mode = row.datafast_mode.parse::<GatewayMode>()?;
        let settings = PaymentSettings {
            datafast: GatewaySettings {
                enabled: row.datafast_enabled,
                mode,
                entity_id: row.datafast_entity_id,
                access_token: Secret::new(row.datafast_access_token),
            },
            updated_at: Some(row.updated_at),
        };
        settings.validate().map_err(|e| {
            error!("🪛️ Stored payment settings are invalid. {e}");
            e
        })?;
        Ok(settings)
    }
}

/// A partial update to the payment settings, as submitted by an administrator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub datafast_enabled: Option<bool>,
    pub datafast_mode: Option<GatewayMode>,
    pub datafast_entity_id: Option<String>,
    pub datafast_access_token: Option<Secret<String>>,
}

//--------------------------------------         Media         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMediaRecord {
    pub file_name: String,
    pub file_url: String,
    pub file_type: MediaType,
    #[serde(default)]
    pub instagram_post_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct MediaRecord {
    pub id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_type: MediaType,
    pub instagram_post_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use raffle_payment_engine::{AuthApiError, GatewayError, MediaApiError, OrderFlowError, SettingsApiError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    InvalidOrderState(String),
    #[error("Missing resourcePath parameter")]
    MissingResourcePath,
    #[error("Invalid resourcePath parameter")]
    InvalidResourcePath,
    #[error("Could not load payment settings")]
    SettingsUnavailable,
    #[error("DataFast payment method is disabled")]
    PaymentMethodDisabled,
    #[error("DataFast status API error")]
    GatewayRejected { status: u16, details: String },
    #[error("The payment gateway could not be reached. Please try again later.")]
    GatewayUnavailable,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::MissingResourcePath => StatusCode::BAD_REQUEST,
            Self::InvalidResourcePath => StatusCode::BAD_REQUEST,
            Self::PaymentMethodDisabled => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidOrderState(_) => StatusCode::CONFLICT,
            Self::GatewayRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SettingsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::GatewayRejected { details, .. } => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing authorization header.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::RoleNotAllowed(_) => {
                Self::AuthenticationError(AuthError::InsufficientPermissions(e.to_string()))
            },
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Disabled => Self::PaymentMethodDisabled,
            GatewayError::InvalidResourcePath(_) => Self::InvalidResourcePath,
            GatewayError::Rejected { status, body } => Self::GatewayRejected { status, details: body },
            GatewayError::Unavailable(reason) | GatewayError::InvalidResponse(reason) => {
                error!("💳️ Payment gateway error. {reason}");
                Self::GatewayUnavailable
            },
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            OrderFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::InvalidQuantity(_) |
            OrderFlowError::InvalidPrice(_) |
            OrderFlowError::InvalidRaffleId |
            OrderFlowError::AmountOverflow => Self::ValidationError(e.to_string()),
            OrderFlowError::OrderIdExhausted(_) => Self::BackendError(e.to_string()),
            OrderFlowError::InvalidOrderState { .. } => Self::InvalidOrderState(e.to_string()),
            OrderFlowError::GatewayError(e) => e.into(),
        }
    }
}

impl From<SettingsApiError> for ServerError {
    fn from(e: SettingsApiError) -> Self {
        error!("🪛️ {e}");
        Self::SettingsUnavailable
    }
}

impl From<MediaApiError> for ServerError {
    fn from(e: MediaApiError) -> Self {
        match e {
            MediaApiError::InsufficientPermissions(_) => {
                Self::AuthenticationError(AuthError::InsufficientPermissions(e.to_string()))
            },
            MediaApiError::ValidationError(_) => Self::ValidationError(e.to_string()),
            MediaApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

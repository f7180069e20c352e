use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataFastApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid resource path: {0}")]
    InvalidResourcePath(String),
    #[error("Gateway unreachable: {0}")]
    Unavailable(String),
    #[error("Gateway returned error {status}. {body}")]
    Rejected { status: u16, body: String },
    #[error("Could not deserialize gateway response: {0}")]
    JsonError(String),
}

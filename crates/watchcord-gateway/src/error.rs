use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

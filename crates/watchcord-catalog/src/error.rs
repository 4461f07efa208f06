use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid catalog payload: {0}")]
    Decode(String),
}

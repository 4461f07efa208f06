use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("gateway error: {0}")]
    Gateway(#[from] watchcord_gateway::GatewayError),
    #[error("catalog error: {0}")]
    Catalog(#[from] watchcord_catalog::CatalogError),
    #[error("config error: {0}")]
    Config(String),
    /// A client-level error event. Never recovered locally: the run loop
    /// surfaces it so the host's supervision restarts the bridge.
    #[error("client connection error: {0}")]
    Connection(String),
}

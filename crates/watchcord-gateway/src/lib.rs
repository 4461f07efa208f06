pub mod cache;
pub mod error;
pub mod events;
pub mod rest;

pub use cache::GatewayCache;
pub use error::GatewayError;
pub use events::{event_channel, EventSender, EventStream};
pub use rest::RestClient;

use watchcord_models::{Channel, User};

/// Handle to an already-authenticated chat-platform client: the REST
/// fetcher used at registry build time plus the in-memory caches the
/// connection owner keeps primed. Connection, handshake, and heartbeat
/// live outside this workspace.
pub struct GatewayClient {
    rest: RestClient,
    cache: GatewayCache,
}

impl GatewayClient {
    pub fn new(rest: RestClient) -> Self {
        Self {
            rest,
            cache: GatewayCache::new(),
        }
    }

    pub fn cache(&self) -> &GatewayCache {
        &self.cache
    }

    pub async fn fetch_user(&self, user_id: i64) -> Result<User, GatewayError> {
        self.rest.fetch_user(user_id).await
    }

    pub async fn fetch_channel(&self, channel_id: i64) -> Result<Channel, GatewayError> {
        self.rest.fetch_channel(channel_id).await
    }
}

pub mod bridge;
pub mod config;
pub mod enrich;
pub mod error;
pub mod host;
pub mod record;
pub mod registry;
pub mod sync;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use enrich::ActivityEnricher;
pub use error::BridgeError;
pub use host::{EntityDescriptor, HostBus, StateRefresh};
pub use record::{ChannelRecord, EntityRecord};
pub use registry::Registry;
pub use sync::Synchronizer;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use watchcord_gateway::GatewayClient;

use crate::config::BridgeConfig;
use crate::host::EntityDescriptor;
use crate::record::{ChannelRecord, EntityRecord};

pub type SharedRecord = Arc<RwLock<EntityRecord>>;
pub type SharedChannel = Arc<RwLock<ChannelRecord>>;

/// Immutable mapping from identity key to entity record, built once at
/// startup from operator configuration. Membership never changes while
/// the bridge runs; only the records themselves are mutated.
pub struct Registry {
    members: HashMap<String, SharedRecord>,
    channels: HashMap<i64, SharedChannel>,
    descriptors: Vec<EntityDescriptor>,
}

impl Registry {
    /// Resolve every configured identifier against the chat platform.
    /// Numeric identifiers are fetched over REST; anything else is a
    /// legacy `name#discriminator` (or bare-name) key that resolves
    /// against the key space directly, no fetch. A failed lookup skips
    /// that one entry; partial registries are valid.
    pub async fn build(config: &BridgeConfig, client: &GatewayClient) -> Self {
        let mut member_records = Vec::with_capacity(config.members.len());
        for raw in &config.members {
            match parse_snowflake(raw) {
                Some(user_id) => match client.fetch_user(user_id).await {
                    Ok(user) => {
                        let mut record = EntityRecord::new(
                            format!("watchcord_user_{user_id}"),
                            user.identity_key(),
                        );
                        record.user_id = Some(user.id);
                        record.username = Some(user.username.clone());
                        record.user_name = user.global_name.clone();
                        record.avatar_url =
                            Some(user.avatar_url(&config.cdn_base, config.image_format));
                        member_records.push(record);
                    }
                    Err(error) => {
                        tracing::warn!(identifier = %raw, %error, "member lookup failed, skipping")
                    }
                },
                None => {
                    member_records.push(EntityRecord::new(
                        format!("watchcord_user_{}", slug(raw)),
                        raw.clone(),
                    ));
                }
            }
        }

        let mut channel_records = Vec::with_capacity(config.channels.len());
        for raw in &config.channels {
            match parse_snowflake(raw) {
                Some(channel_id) => match client.fetch_channel(channel_id).await {
                    Ok(channel) => channel_records.push(ChannelRecord::new(
                        format!("watchcord_channel_{channel_id}"),
                        channel_id,
                        channel.name,
                    )),
                    Err(error) => {
                        tracing::warn!(identifier = %raw, %error, "channel lookup failed, skipping")
                    }
                },
                None => {
                    tracing::warn!(identifier = %raw, "channel identifier is not a snowflake, skipping")
                }
            }
        }

        let registry = Self::from_records(member_records, channel_records);
        tracing::info!(
            members = registry.members.len(),
            channels = registry.channels.len(),
            "identity registry built"
        );
        registry
    }

    /// Assemble a registry from already-resolved records. `build` ends
    /// here; tests and hosts that do their own resolution start here.
    pub fn from_records(
        member_records: Vec<EntityRecord>,
        channel_records: Vec<ChannelRecord>,
    ) -> Self {
        let mut members = HashMap::with_capacity(member_records.len());
        let mut channels = HashMap::with_capacity(channel_records.len());
        let mut descriptors = Vec::with_capacity(member_records.len() + channel_records.len());

        for record in member_records {
            if members.contains_key(&record.identity_key) {
                tracing::warn!(key = %record.identity_key, "duplicate identity key, keeping the first");
                continue;
            }
            descriptors.push(EntityDescriptor {
                entity_id: record.entity_id.clone(),
                name: record.identity_key.clone(),
                children: EntityRecord::ATTRIBUTES
                    .iter()
                    .map(|attr| format!("{}_{}", record.entity_id, attr))
                    .collect(),
            });
            members.insert(record.identity_key.clone(), Arc::new(RwLock::new(record)));
        }

        for record in channel_records {
            if channels.contains_key(&record.channel_id) {
                tracing::warn!(channel_id = record.channel_id, "duplicate channel, keeping the first");
                continue;
            }
            descriptors.push(EntityDescriptor {
                entity_id: record.entity_id.clone(),
                name: record.channel_name.clone(),
                children: Vec::new(),
            });
            channels.insert(record.channel_id, Arc::new(RwLock::new(record)));
        }

        Self {
            members,
            channels,
            descriptors,
        }
    }

    pub fn member(&self, key: &str) -> Option<SharedRecord> {
        self.members.get(key).cloned()
    }

    pub fn channel(&self, channel_id: i64) -> Option<SharedChannel> {
        self.channels.get(&channel_id).cloned()
    }

    pub fn members(&self) -> impl Iterator<Item = (&String, &SharedRecord)> {
        self.members.iter()
    }

    pub fn channels(&self) -> impl Iterator<Item = (&i64, &SharedChannel)> {
        self.channels.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Registration payload for the host: one parent descriptor per
    /// record, members carrying one child per exposed attribute.
    pub fn descriptors(&self) -> &[EntityDescriptor] {
        &self.descriptors
    }
}

/// Snowflakes fit in at most 20 digits (2^64 is 20 digits long).
fn parse_snowflake(raw: &str) -> Option<i64> {
    if raw.is_empty() || raw.len() > 20 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn slug(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

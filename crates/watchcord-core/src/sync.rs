use std::sync::Arc;

use watchcord_gateway::{EventStream, GatewayClient};
use watchcord_models::{GatewayEvent, ImageFormat, Member, ReactionAdd, User, VoiceState};

use crate::config::BridgeConfig;
use crate::enrich::ActivityEnricher;
use crate::error::BridgeError;
use crate::host::HostBus;
use crate::record::EntityRecord;
use crate::registry::Registry;

/// The event-handler set: consumes the gateway stream, mutates the
/// matching records, and requests one host state refresh per affected
/// record. Events for identities or channels outside the registry are
/// no-ops.
pub struct Synchronizer {
    registry: Arc<Registry>,
    client: Arc<GatewayClient>,
    enricher: ActivityEnricher,
    host: HostBus,
    cdn_base: String,
    image_format: ImageFormat,
}

impl Synchronizer {
    pub fn new(
        registry: Arc<Registry>,
        client: Arc<GatewayClient>,
        enricher: ActivityEnricher,
        host: HostBus,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            registry,
            client,
            enricher,
            host,
            cdn_base: config.cdn_base.trim_end_matches('/').to_string(),
            image_format: config.image_format,
        }
    }

    /// Drive the dispatch loop until the stream closes. Returns `Err`
    /// only for a client-level error event, which is always fatal: the
    /// host's supervision restarts the bridge rather than letting a
    /// long-lived connection drift out of sync.
    pub async fn run(self, mut events: EventStream) -> Result<(), BridgeError> {
        tracing::info!(
            members = self.registry.member_count(),
            channels = self.registry.channel_count(),
            "presence synchronizer started"
        );
        while let Some(event) = events.next().await {
            tracing::debug!(kind = event.kind(), "gateway event");
            match event {
                GatewayEvent::Ready => self.on_ready().await,
                GatewayEvent::MemberUpdate { after, .. }
                | GatewayEvent::PresenceUpdate { after, .. } => {
                    self.on_member_update(after).await
                }
                GatewayEvent::UserUpdate { after, .. } => self.on_user_update(after).await,
                GatewayEvent::VoiceStateUpdate { member, after, .. } => {
                    self.on_voice_state_update(member, after).await
                }
                GatewayEvent::ReactionAdd(payload) => self.on_reaction_add(payload).await,
                GatewayEvent::Error(message) => {
                    tracing::error!(%message, "client error event, surfacing for restart");
                    return Err(BridgeError::Connection(message));
                }
            }
        }
        tracing::info!("event stream closed, synchronizer stopping");
        Ok(())
    }

    /// Full resync: every tracked identity is re-read from the client
    /// cache and fully recomputed. Identities the cache does not know
    /// stay in their last-known state with no refresh.
    async fn on_ready(&self) {
        let cache = self.client.cache();
        for (key, shared) in self.registry.members() {
            let user = cache.user(key);
            let member = cache.member(key);
            if user.is_none() && member.is_none() {
                tracing::warn!(%key, "tracked identity absent from client cache");
                continue;
            }
            let mut record = shared.write().await;
            if let Some(user) = user {
                self.apply_user(&mut record, &user);
            }
            if let Some(member) = member {
                self.apply_member(&mut record, &member).await;
            }
            self.host.request_refresh(&record.entity_id, false);
        }
        for (_, shared) in self.registry.channels() {
            let record = shared.read().await;
            self.host.request_refresh(&record.entity_id, false);
        }
    }

    async fn on_member_update(&self, after: Member) {
        let Some(shared) = self.registry.member(&after.identity_key()) else {
            return;
        };
        let mut record = shared.write().await;
        self.apply_member(&mut record, &after).await;
        self.host.request_refresh(&record.entity_id, false);
    }

    async fn on_user_update(&self, after: User) {
        let Some(shared) = self.registry.member(&after.identity_key()) else {
            return;
        };
        let mut record = shared.write().await;
        self.apply_user(&mut record, &after);
        self.host.request_refresh(&record.entity_id, false);
    }

    /// Rewrites the voice block and nothing else; presence and activity
    /// fields keep their current values.
    async fn on_voice_state_update(&self, member: Member, after: VoiceState) {
        let Some(shared) = self.registry.member(&member.identity_key()) else {
            return;
        };
        let mut record = shared.write().await;
        apply_voice(&mut record, &after);
        self.host.request_refresh(&record.entity_id, false);
    }

    async fn on_reaction_add(&self, payload: ReactionAdd) {
        let Some(shared) = self.registry.channel(payload.channel_id) else {
            return;
        };
        let member = payload
            .member
            .or_else(|| self.client.cache().member_by_user_id(payload.user_id));
        let Some(member) = member else {
            tracing::debug!(
                user_id = payload.user_id,
                channel_id = payload.channel_id,
                "reacting member unresolved, leaving channel state as-is"
            );
            return;
        };
        let mut record = shared.write().await;
        record.last_user = Some(member.display_name().to_string());
        self.host.request_refresh(&record.entity_id, false);
    }

    /// Full presence recompute: null out everything a presence carries,
    /// then repopulate status, roles, display name, voice, and the
    /// activity slots.
    async fn apply_member(&self, record: &mut EntityRecord, member: &Member) {
        record.clear_presence();
        record.status = member.status;
        record.display_name = Some(member.display_name().to_string());
        record.roles = Some(member.roles.iter().map(|r| r.name.clone()).collect());
        if let Some(voice) = &member.voice {
            apply_voice(record, voice);
        }
        self.enricher.apply(record, &member.activities).await;
    }

    fn apply_user(&self, record: &mut EntityRecord, user: &User) {
        record.user_id = Some(user.id);
        record.username = Some(user.username.clone());
        record.user_name = user.global_name.clone();
        record.avatar_url = Some(user.avatar_url(&self.cdn_base, self.image_format));
    }
}

fn apply_voice(record: &mut EntityRecord, voice: &VoiceState) {
    record.voice_channel = voice.channel.as_ref().map(|c| c.name.clone());
    record.voice_deaf = Some(voice.deaf);
    record.voice_mute = Some(voice.mute);
    record.voice_self_deaf = Some(voice.self_deaf);
    record.voice_self_mute = Some(voice.self_mute);
    record.voice_self_stream = Some(voice.self_stream);
    record.voice_self_video = Some(voice.self_video);
    record.voice_afk = Some(voice.afk);
}

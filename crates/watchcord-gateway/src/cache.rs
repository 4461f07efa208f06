use dashmap::DashMap;
use watchcord_models::{Channel, Member, User};

/// In-memory mirror of the gateway's user/member/channel state, keyed the
/// way registry lookups arrive. The connection owner keeps it primed; the
/// synchronizer reads it during `ready` resyncs.
pub struct GatewayCache {
    users: DashMap<String, User>,
    members: DashMap<String, Member>,
    channels: DashMap<i64, Channel>,
}

impl GatewayCache {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            members: DashMap::new(),
            channels: DashMap::new(),
        }
    }

    pub fn insert_user(&self, user: User) {
        self.users.insert(user.identity_key(), user);
    }

    pub fn insert_member(&self, member: Member) {
        self.members.insert(member.identity_key(), member);
    }

    pub fn insert_channel(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    pub fn user(&self, key: &str) -> Option<User> {
        self.users.get(key).map(|u| u.clone())
    }

    pub fn member(&self, key: &str) -> Option<Member> {
        self.members.get(key).map(|m| m.clone())
    }

    pub fn channel(&self, channel_id: i64) -> Option<Channel> {
        self.channels.get(&channel_id).map(|c| c.clone())
    }

    /// Reaction payloads only carry a user id; resolve it against the
    /// member mirror.
    pub fn member_by_user_id(&self, user_id: i64) -> Option<Member> {
        self.members
            .iter()
            .find(|entry| entry.user.id == user_id)
            .map(|entry| entry.clone())
    }
}

impl Default for GatewayCache {
    fn default() -> Self {
        Self::new()
    }
}

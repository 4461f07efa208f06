use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::user::User;
use crate::voice::VoiceState;

/// Push events consumed from the already-authenticated chat-platform
/// client. Transport and handshake live outside this workspace; whoever
/// owns the connection translates wire frames into these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GatewayEvent {
    /// Connection established and caches primed; triggers a full resync.
    Ready,
    MemberUpdate {
        before: Option<Member>,
        after: Member,
    },
    PresenceUpdate {
        before: Option<Member>,
        after: Member,
    },
    UserUpdate {
        before: Option<User>,
        after: User,
    },
    VoiceStateUpdate {
        member: Member,
        before: Option<VoiceState>,
        after: VoiceState,
    },
    ReactionAdd(ReactionAdd),
    /// Client-level error. Always fatal to the event loop so the host's
    /// supervision restarts the bridge instead of drifting out of sync.
    Error(String),
}

impl GatewayEvent {
    /// Stable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayEvent::Ready => "ready",
            GatewayEvent::MemberUpdate { .. } => "member_update",
            GatewayEvent::PresenceUpdate { .. } => "presence_update",
            GatewayEvent::UserUpdate { .. } => "user_update",
            GatewayEvent::VoiceStateUpdate { .. } => "voice_state_update",
            GatewayEvent::ReactionAdd(_) => "reaction_add",
            GatewayEvent::Error(_) => "error",
        }
    }
}

/// Raw reaction payload. The member is attached when the gateway had it
/// cached; the synchronizer falls back to its own cache otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAdd {
    pub channel_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub emoji: Option<String>,
    pub member: Option<Member>,
}

use serde::{Deserialize, Serialize};

use crate::presence::{Activity, OnlineStatus};
use crate::user::User;
use crate::voice::VoiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// Guild-scoped view of a user, as carried by presence-bearing gateway
/// events: profile, ordered roles, live presence, and voice state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    pub nick: Option<String>,
    pub roles: Vec<Role>,
    pub status: OnlineStatus,
    pub activities: Vec<Activity>,
    pub voice: Option<VoiceState>,
}

impl Member {
    pub fn identity_key(&self) -> String {
        self.user.identity_key()
    }

    /// Guild nickname, falling back to the global display name, then the
    /// username.
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.user.global_name.as_deref())
            .unwrap_or(&self.user.username)
    }
}

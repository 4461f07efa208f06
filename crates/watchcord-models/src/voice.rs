use serde::{Deserialize, Serialize};

/// Channel reference carried inside a voice state, pre-resolved to a name
/// so consumers never need a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceState {
    /// The voice channel the user occupies, or `None` after a disconnect.
    pub channel: Option<ChannelRef>,
    pub deaf: bool,
    pub mute: bool,
    pub self_deaf: bool,
    pub self_mute: bool,
    pub self_stream: bool,
    pub self_video: bool,
    pub afk: bool,
}

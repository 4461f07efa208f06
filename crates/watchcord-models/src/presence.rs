use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    Offline,
    Unknown,
}

impl OnlineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OnlineStatus::Online => "online",
            OnlineStatus::Idle => "idle",
            OnlineStatus::Dnd => "dnd",
            OnlineStatus::Offline => "offline",
            OnlineStatus::Unknown => "unknown",
        }
    }
}

impl Default for OnlineStatus {
    fn default() -> Self {
        OnlineStatus::Unknown
    }
}

/// One concurrent activity on a presence. A presence may carry several;
/// the bridge keeps one slot per variant and the last of each kind wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Activity {
    Playing(PlayingActivity),
    Streaming(StreamingActivity),
    Listening(ListeningActivity),
    Watching(GenericActivity),
    Custom(CustomStatus),
    /// Kinds the bridge does not track (competing, future additions).
    Unknown,
}

/// Rich-presence image assets attached to a playing activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityAssets {
    pub small_image_url: Option<String>,
    pub large_image_url: Option<String>,
    pub small_image_text: Option<String>,
    pub large_image_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayingActivity {
    pub name: String,
    pub state: Option<String>,
    pub details: Option<String>,
    /// Application id as registered in the platform's app directory.
    pub application_id: Option<i64>,
    pub assets: Option<ActivityAssets>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingActivity {
    pub name: String,
    pub details: Option<String>,
    pub url: Option<String>,
}

/// Listening activities come in two shapes: the platform-integrated
/// Spotify presence with full track metadata, and everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ListeningActivity {
    Spotify(SpotifyTrack),
    Generic(GenericActivity),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericActivity {
    pub name: String,
    pub state: Option<String>,
    pub details: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub album_cover_url: String,
    pub track_id: String,
    pub duration_secs: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomStatus {
    /// The status text, when set.
    pub text: Option<String>,
    /// Name of the attached emoji, when present.
    pub emoji: Option<String>,
    pub state: Option<String>,
}

use serde_json::Value;
use watchcord_models::OnlineStatus;

/// Per-identity attribute bag the host platform renders as a sensor.
/// A fixed struct rather than a name-keyed map: every exposed attribute
/// is statically known, enumerated by [`EntityRecord::ATTRIBUTES`] and
/// read through [`EntityRecord::attribute`].
///
/// Created once at startup, mutated in place by the synchronizer, never
/// destroyed while the bridge is loaded.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub entity_id: String,
    pub identity_key: String,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    /// Account-wide display name.
    pub user_name: Option<String>,
    /// Guild display name.
    pub display_name: Option<String>,
    pub roles: Option<Vec<String>>,
    pub status: OnlineStatus,
    /// Free-form state line of the last non-game activity that carried one.
    pub activity_state: Option<String>,
    pub game: Option<String>,
    pub game_state: Option<String>,
    pub game_details: Option<String>,
    pub game_image_small: Option<String>,
    pub game_image_large: Option<String>,
    pub game_image_small_text: Option<String>,
    pub game_image_large_text: Option<String>,
    pub game_image_capsule_231x87: Option<String>,
    pub game_image_capsule_467x181: Option<String>,
    pub game_image_capsule_616x353: Option<String>,
    pub game_image_header: Option<String>,
    pub game_image_hero_capsule: Option<String>,
    pub game_image_library_600x900: Option<String>,
    pub game_image_library_hero: Option<String>,
    pub game_image_logo: Option<String>,
    pub game_image_page_bg_raw: Option<String>,
    pub streaming: Option<String>,
    pub streaming_url: Option<String>,
    pub streaming_details: Option<String>,
    pub listening: Option<String>,
    pub listening_url: Option<String>,
    pub listening_details: Option<String>,
    pub spotify_artists: Option<String>,
    pub spotify_title: Option<String>,
    pub spotify_album: Option<String>,
    pub spotify_album_cover_url: Option<String>,
    pub spotify_track_id: Option<String>,
    pub spotify_duration: Option<String>,
    pub spotify_start: Option<String>,
    pub spotify_end: Option<String>,
    pub watching: Option<String>,
    pub watching_url: Option<String>,
    pub watching_details: Option<String>,
    pub avatar_url: Option<String>,
    pub custom_status: Option<String>,
    pub custom_emoji: Option<String>,
    pub voice_channel: Option<String>,
    pub voice_deaf: Option<bool>,
    pub voice_mute: Option<bool>,
    pub voice_self_deaf: Option<bool>,
    pub voice_self_mute: Option<bool>,
    pub voice_self_stream: Option<bool>,
    pub voice_self_video: Option<bool>,
    pub voice_afk: Option<bool>,
}

impl EntityRecord {
    pub fn new(entity_id: String, identity_key: String) -> Self {
        Self {
            entity_id,
            identity_key,
            user_id: None,
            username: None,
            user_name: None,
            display_name: None,
            roles: None,
            status: OnlineStatus::Unknown,
            activity_state: None,
            game: None,
            game_state: None,
            game_details: None,
            game_image_small: None,
            game_image_large: None,
            game_image_small_text: None,
            game_image_large_text: None,
            game_image_capsule_231x87: None,
            game_image_capsule_467x181: None,
            game_image_capsule_616x353: None,
            game_image_header: None,
            game_image_hero_capsule: None,
            game_image_library_600x900: None,
            game_image_library_hero: None,
            game_image_logo: None,
            game_image_page_bg_raw: None,
            streaming: None,
            streaming_url: None,
            streaming_details: None,
            listening: None,
            listening_url: None,
            listening_details: None,
            spotify_artists: None,
            spotify_title: None,
            spotify_album: None,
            spotify_album_cover_url: None,
            spotify_track_id: None,
            spotify_duration: None,
            spotify_start: None,
            spotify_end: None,
            watching: None,
            watching_url: None,
            watching_details: None,
            avatar_url: None,
            custom_status: None,
            custom_emoji: None,
            voice_channel: None,
            voice_deaf: None,
            voice_mute: None,
            voice_self_deaf: None,
            voice_self_mute: None,
            voice_self_stream: None,
            voice_self_video: None,
            voice_afk: None,
        }
    }

    /// Host-facing primary state.
    pub fn state(&self) -> &'static str {
        self.status.as_str()
    }

    /// Attribute names exposed to the host, one sub-sensor each.
    pub const ATTRIBUTES: [&'static str; 49] = [
        "user_id",
        "user_name",
        "display_name",
        "roles",
        "activity_state",
        "game",
        "game_state",
        "game_details",
        "game_image_small",
        "game_image_large",
        "game_image_small_text",
        "game_image_large_text",
        "game_image_capsule_231x87",
        "game_image_capsule_467x181",
        "game_image_capsule_616x353",
        "game_image_header",
        "game_image_hero_capsule",
        "game_image_library_600x900",
        "game_image_library_hero",
        "game_image_logo",
        "game_image_page_bg_raw",
        "streaming",
        "streaming_url",
        "streaming_details",
        "listening",
        "listening_url",
        "listening_details",
        "spotify_artists",
        "spotify_title",
        "spotify_album",
        "spotify_album_cover_url",
        "spotify_track_id",
        "spotify_duration",
        "spotify_start",
        "spotify_end",
        "watching",
        "watching_url",
        "watching_details",
        "avatar_url",
        "custom_status",
        "custom_emoji",
        "voice_channel",
        "voice_deaf",
        "voice_mute",
        "voice_self_deaf",
        "voice_self_mute",
        "voice_self_stream",
        "voice_self_video",
        "voice_afk",
    ];

    /// Current value of one exposed attribute; `None` for names outside
    /// [`Self::ATTRIBUTES`].
    pub fn attribute(&self, name: &str) -> Option<Value> {
        fn text(v: &Option<String>) -> Value {
            v.as_deref().map(Value::from).unwrap_or(Value::Null)
        }
        fn flag(v: Option<bool>) -> Value {
            v.map(Value::from).unwrap_or(Value::Null)
        }
        let value = match name {
            "user_id" => self.user_id.map(Value::from).unwrap_or(Value::Null),
            "user_name" => text(&self.user_name),
            "display_name" => text(&self.display_name),
            "roles" => self
                .roles
                .as_ref()
                .map(|r| Value::from(r.clone()))
                .unwrap_or(Value::Null),
            "activity_state" => text(&self.activity_state),
            "game" => text(&self.game),
            "game_state" => text(&self.game_state),
            "game_details" => text(&self.game_details),
            "game_image_small" => text(&self.game_image_small),
            "game_image_large" => text(&self.game_image_large),
            "game_image_small_text" => text(&self.game_image_small_text),
            "game_image_large_text" => text(&self.game_image_large_text),
            "game_image_capsule_231x87" => text(&self.game_image_capsule_231x87),
            "game_image_capsule_467x181" => text(&self.game_image_capsule_467x181),
            "game_image_capsule_616x353" => text(&self.game_image_capsule_616x353),
            "game_image_header" => text(&self.game_image_header),
            "game_image_hero_capsule" => text(&self.game_image_hero_capsule),
            "game_image_library_600x900" => text(&self.game_image_library_600x900),
            "game_image_library_hero" => text(&self.game_image_library_hero),
            "game_image_logo" => text(&self.game_image_logo),
            "game_image_page_bg_raw" => text(&self.game_image_page_bg_raw),
            "streaming" => text(&self.streaming),
            "streaming_url" => text(&self.streaming_url),
            "streaming_details" => text(&self.streaming_details),
            "listening" => text(&self.listening),
            "listening_url" => text(&self.listening_url),
            "listening_details" => text(&self.listening_details),
            "spotify_artists" => text(&self.spotify_artists),
            "spotify_title" => text(&self.spotify_title),
            "spotify_album" => text(&self.spotify_album),
            "spotify_album_cover_url" => text(&self.spotify_album_cover_url),
            "spotify_track_id" => text(&self.spotify_track_id),
            "spotify_duration" => text(&self.spotify_duration),
            "spotify_start" => text(&self.spotify_start),
            "spotify_end" => text(&self.spotify_end),
            "watching" => text(&self.watching),
            "watching_url" => text(&self.watching_url),
            "watching_details" => text(&self.watching_details),
            "avatar_url" => text(&self.avatar_url),
            "custom_status" => text(&self.custom_status),
            "custom_emoji" => text(&self.custom_emoji),
            "voice_channel" => text(&self.voice_channel),
            "voice_deaf" => flag(self.voice_deaf),
            "voice_mute" => flag(self.voice_mute),
            "voice_self_deaf" => flag(self.voice_self_deaf),
            "voice_self_mute" => flag(self.voice_self_mute),
            "voice_self_stream" => flag(self.voice_self_stream),
            "voice_self_video" => flag(self.voice_self_video),
            "voice_afk" => flag(self.voice_afk),
            _ => return None,
        };
        Some(value)
    }

    /// Null out everything a presence recompute repopulates. Identity and
    /// avatar fields survive; those change only on user-update events.
    pub fn clear_presence(&mut self) {
        self.activity_state = None;
        self.game = None;
        self.game_state = None;
        self.game_details = None;
        self.game_image_small = None;
        self.game_image_large = None;
        self.game_image_small_text = None;
        self.game_image_large_text = None;
        self.game_image_capsule_231x87 = None;
        self.game_image_capsule_467x181 = None;
        self.game_image_capsule_616x353 = None;
        self.game_image_header = None;
        self.game_image_hero_capsule = None;
        self.game_image_library_600x900 = None;
        self.game_image_library_hero = None;
        self.game_image_logo = None;
        self.game_image_page_bg_raw = None;
        self.streaming = None;
        self.streaming_url = None;
        self.streaming_details = None;
        self.listening = None;
        self.listening_url = None;
        self.listening_details = None;
        self.spotify_artists = None;
        self.spotify_title = None;
        self.spotify_album = None;
        self.spotify_album_cover_url = None;
        self.spotify_track_id = None;
        self.spotify_duration = None;
        self.spotify_start = None;
        self.spotify_end = None;
        self.watching = None;
        self.watching_url = None;
        self.watching_details = None;
        self.custom_status = None;
        self.custom_emoji = None;
        self.voice_channel = None;
        self.voice_deaf = None;
        self.voice_mute = None;
        self.voice_self_deaf = None;
        self.voice_self_mute = None;
        self.voice_self_stream = None;
        self.voice_self_video = None;
        self.voice_afk = None;
    }
}

/// Per-channel record. The exposed primary state is the display name of
/// the last member to add a reaction, not a count or emoji.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub entity_id: String,
    pub channel_id: i64,
    pub channel_name: String,
    pub last_user: Option<String>,
}

impl ChannelRecord {
    pub fn new(entity_id: String, channel_id: i64, channel_name: String) -> Self {
        Self {
            entity_id,
            channel_id,
            channel_name,
            last_user: None,
        }
    }

    pub fn state(&self) -> &str {
        self.last_user.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_attribute_resolves() {
        let record = EntityRecord::new("watchcord_user_1".into(), "nelly".into());
        for name in EntityRecord::ATTRIBUTES {
            assert!(record.attribute(name).is_some(), "unmapped attribute {name}");
        }
        assert!(record.attribute("no_such_field").is_none());
    }

    #[test]
    fn clear_presence_spares_identity_fields() {
        let mut record = EntityRecord::new("watchcord_user_1".into(), "nelly".into());
        record.user_id = Some(1);
        record.avatar_url = Some("https://cdn.example.com/a.webp".into());
        record.game = Some("Factorio".into());
        record.voice_channel = Some("General".into());
        record.clear_presence();
        assert_eq!(record.user_id, Some(1));
        assert!(record.avatar_url.is_some());
        assert!(record.game.is_none());
        assert!(record.voice_channel.is_none());
    }

    #[test]
    fn channel_state_is_the_last_reacting_user() {
        let mut chan = ChannelRecord::new("watchcord_channel_9".into(), 9, "general".into());
        assert_eq!(chan.state(), "unknown");
        chan.last_user = Some("Nelly".into());
        assert_eq!(chan.state(), "Nelly");
    }
}

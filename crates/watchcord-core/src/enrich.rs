use std::sync::Arc;

use chrono::Utc;
use watchcord_catalog::{CatalogCache, ResourceProber};
use watchcord_models::{Activity, ListeningActivity, PlayingActivity};

use crate::config::BridgeConfig;
use crate::record::EntityRecord;

/// Turns a presence's activity list into record attributes. Playing
/// activities are enriched from the two catalogs; every other kind is a
/// verbatim field mapping.
pub struct ActivityEnricher {
    catalog: Arc<CatalogCache>,
    prober: ResourceProber,
    cdn_base: String,
    game_cdn_base: String,
}

impl ActivityEnricher {
    pub fn new(catalog: Arc<CatalogCache>, prober: ResourceProber, config: &BridgeConfig) -> Self {
        Self {
            catalog,
            prober,
            cdn_base: config.cdn_base.trim_end_matches('/').to_string(),
            game_cdn_base: config.game_cdn_base.trim_end_matches('/').to_string(),
        }
    }

    /// Populate the activity slots from a presence's activity list. One
    /// slot exists per kind and the last activity of each kind wins;
    /// kinds the bridge does not track are skipped.
    pub async fn apply(&self, record: &mut EntityRecord, activities: &[Activity]) {
        for activity in activities {
            match activity {
                Activity::Playing(playing) => self.apply_playing(record, playing).await,
                Activity::Streaming(streaming) => {
                    record.streaming = Some(streaming.name.clone());
                    record.streaming_details = streaming.details.clone();
                    record.streaming_url = streaming.url.clone();
                }
                Activity::Listening(ListeningActivity::Spotify(track)) => {
                    record.listening = Some(track.title.clone());
                    record.spotify_artists = Some(track.artists.join(", "));
                    record.spotify_title = Some(track.title.clone());
                    record.spotify_album = Some(track.album.clone());
                    record.spotify_album_cover_url = Some(track.album_cover_url.clone());
                    record.spotify_track_id = Some(track.track_id.clone());
                    record.spotify_duration = Some(format_duration(track.duration_secs));
                    record.spotify_start = Some(track.start.to_rfc3339());
                    record.spotify_end = Some(track.end.to_rfc3339());
                }
                Activity::Listening(ListeningActivity::Generic(listening)) => {
                    record.activity_state = listening.state.clone();
                    record.listening = Some(listening.name.clone());
                    record.listening_details = listening.details.clone();
                    record.listening_url = listening.url.clone();
                }
                Activity::Watching(watching) => {
                    record.activity_state = watching.state.clone();
                    record.watching = Some(watching.name.clone());
                    record.watching_details = watching.details.clone();
                    record.watching_url = watching.url.clone();
                }
                Activity::Custom(custom) => {
                    record.activity_state = custom.state.clone();
                    record.custom_status = custom.text.clone();
                    record.custom_emoji = custom.emoji.clone();
                }
                Activity::Unknown => {}
            }
        }
    }

    async fn apply_playing(&self, record: &mut EntityRecord, playing: &PlayingActivity) {
        record.game = Some(playing.name.clone());
        record.game_state = playing.state.clone();
        record.game_details = playing.details.clone();

        // rich presence images pass through verbatim
        if let Some(assets) = &playing.assets {
            record.game_image_small = assets.small_image_url.clone();
            record.game_image_large = assets.large_image_url.clone();
            record.game_image_small_text = assets.small_image_text.clone();
            record.game_image_large_text = assets.large_image_text.clone();
        }

        // the detectable-app directory only ever fills the small icon,
        // and only when rich presence did not carry one
        if record.game_image_small.is_none() {
            let directory = self.catalog.directory().await;
            let entry = playing
                .application_id
                .and_then(|id| directory.find_by_id(id))
                .or_else(|| directory.find_by_name(&playing.name));
            if let Some(entry) = entry {
                if let Some(icon) = &entry.icon {
                    record.game_image_small = Some(format!(
                        "{}/app-icons/{}/{}.png",
                        self.cdn_base, entry.id, icon
                    ));
                }
            }
        }

        let games = self.catalog.games().await;
        let Some(game) = games.find_by_name(&playing.name) else {
            return;
        };
        tracing::debug!(app_id = game.app_id, name = %game.name, "activity matched game catalog");

        // the platform publishes a fixed set of promo images per app;
        // which ones exist varies, so each URL is probed before use
        let base = format!("{}/{}", self.game_cdn_base, game.app_id);
        let ts = Utc::now().timestamp();
        record.game_image_capsule_231x87 =
            self.probe(format!("{base}/capsule_231x87.jpg?t={ts}")).await;
        record.game_image_capsule_467x181 =
            self.probe(format!("{base}/capsule_467x181.jpg?t={ts}")).await;
        record.game_image_capsule_616x353 =
            self.probe(format!("{base}/capsule_616x353.jpg?t={ts}")).await;
        record.game_image_header = self.probe(format!("{base}/header.jpg?t={ts}")).await;
        record.game_image_hero_capsule = self.probe(format!("{base}/hero_capsule.jpg?t={ts}")).await;
        record.game_image_library_600x900 =
            self.probe(format!("{base}/library_600x900.jpg?t={ts}")).await;
        record.game_image_library_hero =
            self.probe(format!("{base}/library_hero.jpg?t={ts}")).await;
        // logo ships as jpg for most apps; a png, when present, supersedes
        record.game_image_logo = self.probe(format!("{base}/logo.jpg?t={ts}")).await;
        if let Some(png) = self.probe(format!("{base}/logo.png?t={ts}")).await {
            record.game_image_logo = Some(png);
        }
        record.game_image_page_bg_raw = self.probe(format!("{base}/page_bg_raw.jpg?t={ts}")).await;
    }

    async fn probe(&self, url: String) -> Option<String> {
        if self.prober.exists(&url).await {
            Some(url)
        } else {
            None
        }
    }
}

/// H:MM:SS, matching how the platform's own clients render track length.
fn format_duration(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

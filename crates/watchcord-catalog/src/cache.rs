use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use crate::error::CatalogError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The catalogs change rarely; one refresh per hour matches how stale the
/// data is allowed to get.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Game-platform app list endpoint.
    pub game_catalog_url: String,
    /// Chat-platform detectable-application directory endpoint.
    pub app_directory_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            game_catalog_url: "https://api.steampowered.com/ISteamApps/GetAppList/v2/".to_string(),
            app_directory_url: "https://discord.com/api/v10/applications/detectable".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCatalogEntry {
    pub app_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirectoryEntry {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

/// One wholesale-loaded generation of the game-platform catalog: the
/// ordered list plus an exact-name index built at load time.
#[derive(Debug, Default)]
pub struct GameCatalog {
    apps: Vec<GameCatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl GameCatalog {
    fn from_apps(apps: Vec<GameCatalogEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(apps.len());
        for (i, app) in apps.iter().enumerate() {
            // first occurrence wins, matching the linear scan this replaces
            by_name.entry(app.name.clone()).or_insert(i);
        }
        Self { apps, by_name }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&GameCatalogEntry> {
        self.by_name.get(name).map(|&i| &self.apps[i])
    }
}

/// One generation of the detectable-application directory, indexed by
/// application id and by exact name.
#[derive(Debug, Default)]
pub struct AppDirectory {
    apps: Vec<AppDirectoryEntry>,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
}

impl AppDirectory {
    fn from_apps(apps: Vec<AppDirectoryEntry>) -> Self {
        let mut by_id = HashMap::with_capacity(apps.len());
        let mut by_name = HashMap::with_capacity(apps.len());
        for (i, app) in apps.iter().enumerate() {
            by_id.entry(app.id).or_insert(i);
            by_name.entry(app.name.clone()).or_insert(i);
        }
        Self {
            apps,
            by_id,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&AppDirectoryEntry> {
        self.by_id.get(&id).map(|&i| &self.apps[i])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&AppDirectoryEntry> {
        self.by_name.get(name).map(|&i| &self.apps[i])
    }
}

/// Two independently refreshed lookup tables. Each snapshot is built off
/// to the side and swapped in as a single `Arc` replacement, so a reader
/// holding a snapshot never observes a half-built list.
pub struct CatalogCache {
    http: reqwest::Client,
    config: CatalogConfig,
    games: RwLock<Arc<GameCatalog>>,
    directory: RwLock<Arc<AppDirectory>>,
}

impl CatalogCache {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent("watchcord/0.1")
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(Self {
            http,
            config,
            games: RwLock::new(Arc::new(GameCatalog::default())),
            directory: RwLock::new(Arc::new(AppDirectory::default())),
        })
    }

    /// Current game-catalog snapshot. Cheap to clone; stays valid while
    /// held even if a refresh swaps in a newer generation.
    pub async fn games(&self) -> Arc<GameCatalog> {
        self.games.read().await.clone()
    }

    /// Current detectable-application snapshot.
    pub async fn directory(&self) -> Arc<AppDirectory> {
        self.directory.read().await.clone()
    }

    /// Fetch both catalogs and swap in whatever succeeded. A failed fetch
    /// keeps the previous snapshot in place until the next tick; there is
    /// no retry in between.
    pub async fn refresh(&self) {
        match self.fetch_games().await {
            Ok(apps) => {
                let catalog = Arc::new(GameCatalog::from_apps(apps));
                tracing::debug!(apps = catalog.len(), "game catalog loaded");
                *self.games.write().await = catalog;
            }
            Err(e) => {
                tracing::warn!(error = %e, "game catalog refresh failed, keeping previous snapshot")
            }
        }
        match self.fetch_directory().await {
            Ok(apps) => {
                let directory = Arc::new(AppDirectory::from_apps(apps));
                tracing::debug!(apps = directory.len(), "app directory loaded");
                *self.directory.write().await = directory;
            }
            Err(e) => {
                tracing::warn!(error = %e, "app directory refresh failed, keeping previous snapshot")
            }
        }
    }

    async fn fetch_games(&self) -> Result<Vec<GameCatalogEntry>, CatalogError> {
        let resp: GameListResponse = self.get_json(&self.config.game_catalog_url).await?;
        Ok(resp
            .applist
            .apps
            .into_iter()
            .map(|a| GameCatalogEntry {
                app_id: a.appid,
                name: a.name,
            })
            .collect())
    }

    async fn fetch_directory(&self) -> Result<Vec<AppDirectoryEntry>, CatalogError> {
        let dtos: Vec<DetectableAppDto> = self.get_json(&self.config.app_directory_url).await?;
        dtos.into_iter()
            .map(|d| {
                let id = d
                    .id
                    .parse::<i64>()
                    .map_err(|_| CatalogError::Decode(format!("bad application id: {}", d.id)))?;
                Ok(AppDirectoryEntry {
                    id,
                    name: d.name,
                    icon: d.icon,
                })
            })
            .collect()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(CatalogError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Periodic refresh loop. The eager startup refresh has already run by the
/// time this is spawned, so the loop only handles the steady-state ticks.
pub fn spawn_refresh_task(
    cache: Arc<CatalogCache>,
    period: Duration,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // interval fires immediately; the startup refresh covers that tick
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    tracing::debug!("catalog refresh task shutting down");
                    break;
                }
                _ = ticker.tick() => cache.refresh().await,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GameListResponse {
    applist: GameListBody,
}

#[derive(Debug, Deserialize)]
struct GameListBody {
    apps: Vec<GameAppDto>,
}

#[derive(Debug, Deserialize)]
struct GameAppDto {
    appid: i64,
    name: String,
}

/// Directory ids arrive as string-encoded snowflakes.
#[derive(Debug, Deserialize)]
struct DetectableAppDto {
    id: String,
    name: String,
    icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::{routing::get, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    #[derive(Clone)]
    struct FlakyState {
        calls: Arc<AtomicUsize>,
    }

    async fn serve(router: Router) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://{addr}"))
    }

    fn game_list_json(names: &[(i64, &str)]) -> serde_json::Value {
        let apps: Vec<_> = names
            .iter()
            .map(|(id, name)| serde_json::json!({"appid": id, "name": name}))
            .collect();
        serde_json::json!({"applist": {"apps": apps}})
    }

    async fn catalog_router() -> Router {
        Router::new()
            .route(
                "/games",
                get(|| async { Json(game_list_json(&[(427520, "Factorio"), (620, "Portal 2")])) }),
            )
            .route(
                "/detectable",
                get(|| async {
                    Json(serde_json::json!([
                        {"id": "356869127241072640", "name": "Factorio", "icon": "f4c0"},
                        {"id": "356875988589522944", "name": "Portal 2", "icon": null},
                    ]))
                }),
            )
    }

    fn config_for(base: &str) -> CatalogConfig {
        CatalogConfig {
            game_catalog_url: format!("{base}/games"),
            app_directory_url: format!("{base}/detectable"),
        }
    }

    #[tokio::test]
    async fn refresh_loads_both_catalogs() -> anyhow::Result<()> {
        let base = serve(catalog_router().await).await?;
        let cache = CatalogCache::new(config_for(&base))?;
        assert!(cache.games().await.is_empty());

        cache.refresh().await;

        let games = cache.games().await;
        assert_eq!(games.len(), 2);
        assert_eq!(games.find_by_name("Factorio").unwrap().app_id, 427520);
        assert!(games.find_by_name("factorio").is_none());

        let directory = cache.directory().await;
        assert_eq!(directory.len(), 2);
        let entry = directory.find_by_name("Factorio").unwrap();
        assert_eq!(entry.icon.as_deref(), Some("f4c0"));
        assert_eq!(
            directory.find_by_id(356875988589522944).unwrap().name,
            "Portal 2"
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_snapshot() -> anyhow::Result<()> {
        // first call succeeds, later calls return a server error
        let state = FlakyState {
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let router = Router::new()
            .route(
                "/games",
                get(|State(s): State<FlakyState>| async move {
                    if s.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Ok(Json(game_list_json(&[(427520, "Factorio")])))
                    } else {
                        Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }),
            )
            .route("/detectable", get(|| async { Json(serde_json::json!([])) }))
            .with_state(state);
        let base = serve(router).await?;
        let cache = CatalogCache::new(config_for(&base))?;

        cache.refresh().await;
        assert_eq!(cache.games().await.len(), 1);

        cache.refresh().await;
        let games = cache.games().await;
        assert_eq!(games.len(), 1);
        assert!(games.find_by_name("Factorio").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn held_snapshot_survives_a_refresh() -> anyhow::Result<()> {
        let base = serve(catalog_router().await).await?;
        let cache = CatalogCache::new(config_for(&base))?;
        cache.refresh().await;

        let before = cache.games().await;
        cache.refresh().await;
        let after = cache.games().await;

        // a reader holding the old generation sees a complete list, never
        // a partially rebuilt one
        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 2);
        Ok(())
    }
}

pub mod cache;
pub mod error;
pub mod probe;

pub use cache::{
    spawn_refresh_task, AppDirectory, AppDirectoryEntry, CatalogCache, CatalogConfig, GameCatalog,
    GameCatalogEntry, DEFAULT_REFRESH_INTERVAL,
};
pub use error::CatalogError;
pub use probe::ResourceProber;

use std::sync::Arc;

use nv_core::{ArticleStore, Config, Error, Result};
use tracing::{error, info};

pub mod backends;
pub mod kv;
pub mod saved;

pub use backends::*;
pub use kv::{FileKeyValueStore, MemoryKeyValueStore};
pub use saved::{SaveOutcome, SavedArticles, VisitFlag};

pub const STORE_KINDS: &[&str] = &["memory", "rest", "sqlite"];

/// Builds the article store named `kind`.
///
/// A `rest` store without credentials degrades to an empty memory store so
/// readers still get the built-in articles.
pub async fn create_store(kind: &str, config: &Config) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryArticleStore::new())),
        "rest" => match config.store_credentials() {
            Ok((url, key)) => {
                info!("🌐 Using hosted article store at {}", url);
                Ok(Arc::new(RestArticleStore::new(url, key)))
            }
            Err(e) => {
                error!("Missing or invalid store credentials ({}), using memory store", e);
                Ok(Arc::new(MemoryArticleStore::new()))
            }
        },
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(
            SqliteArticleStore::new_with_path(&config.database_path()).await?,
        )),
        #[cfg(not(feature = "sqlite"))]
        "sqlite" => Err(Error::Config(
            "sqlite store requires the `sqlite` feature".to_string(),
        )),
        other => Err(Error::Config(format!(
            "Unknown store: {}. Available stores: {}",
            other,
            STORE_KINDS.join(", ")
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, SaveOutcome, SavedArticles, VisitFlag};
}

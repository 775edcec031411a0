use async_trait::async_trait;
use crate::types::{ArticleQuery, ArticleRow, AudioClip, Company, NewAudioClip};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Fetch articles matching `query`, newest publication first
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRow>>;

    /// Fetch a single article, `None` when the id is unknown
    async fn fetch_article(&self, id: &str) -> Result<Option<ArticleRow>>;

    /// All companies, ordered by name
    async fn fetch_companies(&self) -> Result<Vec<Company>>;

    /// Audio clip recorded for an article, `None` when there is none yet
    async fn fetch_audio_clip(&self, article_id: &str) -> Result<Option<AudioClip>>;

    async fn create_audio_clip(&self, clip: &NewAudioClip) -> Result<AudioClip>;
}

/// Small string key-value store used for per-user local state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

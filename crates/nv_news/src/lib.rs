use std::sync::Arc;

use nv_core::{
    Article, ArticleQuery, ArticleRow, ArticleSource, ArticleStore, AudioClip, Category, Company,
    NewAudioClip, Notifier,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub mod samples;

pub use samples::{find_sample, sample_articles};

pub const AGGREGATOR_SOURCE: &str = "News Aggregator";

/// How much of an article gets read aloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationScope {
    /// Title and description, as read from the feed.
    #[default]
    Summary,
    /// Title and full body, as read from the article page.
    Full,
}

pub fn narration_text(article: &Article, scope: NarrationScope) -> String {
    match scope {
        NarrationScope::Summary => format!("{}. {}", article.title, article.description),
        NarrationScope::Full => format!("{}. {}", article.title, article.content),
    }
}

/// Converts a remote row into the display model.
pub fn map_row(row: ArticleRow) -> Article {
    let category = row
        .category
        .as_deref()
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or_default();
    Article {
        id: row.id,
        title: row.title,
        description: row.description.unwrap_or_default(),
        content: row.content,
        url: row.url.unwrap_or_default(),
        image: row.image_url.unwrap_or_default(),
        published_at: row.published_at,
        source: ArticleSource {
            name: AGGREGATOR_SOURCE.to_string(),
            url: String::new(),
        },
        category,
    }
}

/// Article data provider. Never fails: problems are reported through the
/// notifier and degrade to an empty result.
#[derive(Clone)]
pub struct NewsService {
    store: Arc<dyn ArticleStore>,
    notifier: Arc<dyn Notifier>,
}

impl NewsService {
    pub fn new(store: Arc<dyn ArticleStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Up to `count` articles, newest first, optionally limited to `category`.
    pub async fn list(&self, category: Category, count: usize) -> Vec<Article> {
        info!("📰 Fetching {} news articles for category: {}", count, category);
        let query = ArticleQuery::new(count).with_category(category);

        match self.store.fetch_articles(&query).await {
            Ok(rows) if !rows.is_empty() => rows.into_iter().map(map_row).collect(),
            Ok(_) => {
                debug!("No articles in {} store, using built-in articles", self.store.name());
                let mut articles: Vec<Article> = sample_articles()
                    .into_iter()
                    .filter(|a| category.is_all() || a.category == category)
                    .collect();
                articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                articles.truncate(count);
                articles
            }
            Err(e) => {
                error!("Error fetching news: {}", e);
                self.notifier.error("Failed to fetch news. Please try again.");
                Vec::new()
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Article> {
        match self.store.fetch_article(id).await {
            Ok(Some(row)) => Some(map_row(row)),
            Ok(None) => {
                debug!("Article {} not in {} store, checking built-in articles", id, self.store.name());
                find_sample(id)
            }
            Err(e) => {
                error!("Error fetching article {}: {}", id, e);
                self.notifier.error("Failed to fetch article. Please try again.");
                None
            }
        }
    }

    /// Up to `count` articles of one company, newest first. There is no
    /// built-in fallback for company feeds.
    pub async fn list_for_company(&self, company_id: &str, count: usize) -> Vec<Article> {
        let query = ArticleQuery::new(count).with_company(company_id);
        match self.store.fetch_articles(&query).await {
            Ok(rows) => rows.into_iter().map(map_row).collect(),
            Err(e) => {
                error!("Error fetching articles of company {}: {}", company_id, e);
                self.notifier.error("Failed to fetch articles");
                Vec::new()
            }
        }
    }

    pub async fn companies(&self) -> Vec<Company> {
        match self.store.fetch_companies().await {
            Ok(companies) => companies,
            Err(e) => {
                error!("Error fetching companies: {}", e);
                self.notifier.error("Failed to fetch companies");
                Vec::new()
            }
        }
    }

    pub async fn audio_clip(&self, article_id: &str) -> Option<AudioClip> {
        match self.store.fetch_audio_clip(article_id).await {
            Ok(clip) => clip,
            Err(e) => {
                error!("Error fetching audio clip of {}: {}", article_id, e);
                self.notifier.error("Failed to fetch audio clip");
                None
            }
        }
    }

    pub async fn save_audio_clip(&self, clip: &NewAudioClip) -> Option<AudioClip> {
        match self.store.create_audio_clip(clip).await {
            Ok(created) => {
                info!("🎧 Stored audio clip {} for article {}", created.id, created.article_id);
                Some(created)
            }
            Err(e) => {
                error!("Error creating audio clip: {}", e);
                self.notifier.error("Failed to save audio clip");
                None
            }
        }
    }

    /// Resolves `ids` in order, skipping the ones that no longer exist.
    pub async fn resolve(&self, ids: &[String]) -> Vec<Article> {
        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(article) = self.get_by_id(id).await {
                articles.push(article);
            }
        }
        articles
    }
}

pub mod prelude {
    pub use super::{narration_text, NarrationScope, NewsService};
    pub use nv_core::{Article, Category};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use nv_core::{Error, RecordingNotifier, Result};
    use nv_storage::MemoryArticleStore;

    struct BrokenStore;

    #[async_trait]
    impl ArticleStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch_articles(&self, _query: &ArticleQuery) -> Result<Vec<ArticleRow>> {
            Err(Error::Storage("connection reset".to_string()))
        }

        async fn fetch_article(&self, _id: &str) -> Result<Option<ArticleRow>> {
            Err(Error::Storage("connection reset".to_string()))
        }

        async fn fetch_companies(&self) -> Result<Vec<Company>> {
            Err(Error::Storage("connection reset".to_string()))
        }

        async fn fetch_audio_clip(&self, _article_id: &str) -> Result<Option<AudioClip>> {
            Err(Error::Storage("connection reset".to_string()))
        }

        async fn create_audio_clip(&self, _clip: &NewAudioClip) -> Result<AudioClip> {
            Err(Error::Storage("connection reset".to_string()))
        }
    }

    fn row(id: &str, hour: u32, category: Option<&str>) -> ArticleRow {
        ArticleRow {
            id: id.to_string(),
            company_id: None,
            title: format!("Remote {}", id),
            description: None,
            content: "Remote body".to_string(),
            url: Some("https://example.com/remote".to_string()),
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            category: category.map(str::to_string),
            created_at: None,
        }
    }

    fn service(store: Arc<dyn ArticleStore>) -> (NewsService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (NewsService::new(store, notifier.clone()), notifier)
    }

    #[test]
    fn test_map_row_defaults() {
        let article = map_row(row("r1", 1, Some("weather")));
        assert_eq!(article.category, Category::General);
        assert_eq!(article.description, "");
        assert_eq!(article.image, "");
        assert_eq!(article.url, "https://example.com/remote");
        assert_eq!(article.source.name, AGGREGATOR_SOURCE);
    }

    #[test]
    fn test_narration_text() {
        let article = find_sample("1").unwrap();
        let summary = narration_text(&article, NarrationScope::Summary);
        assert_eq!(summary, format!("{}. {}", article.title, article.description));
        let full = narration_text(&article, NarrationScope::Full);
        assert!(full.ends_with(&article.content));
    }

    #[tokio::test]
    async fn test_list_from_remote_store() {
        let store = MemoryArticleStore::with_rows(vec![
            row("t1", 1, Some("technology")),
            row("t2", 5, Some("technology")),
            row("t3", 3, Some("technology")),
            row("s1", 9, Some("sports")),
        ])
        .await;
        let (service, notifier) = service(Arc::new(store));

        let articles = service.list(Category::Technology, 2).await;
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| a.category == Category::Technology));
        assert_eq!(articles[0].id, "t2");
        assert_eq!(articles[1].id, "t3");
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_list_falls_back_to_samples() {
        let (service, notifier) = service(Arc::new(MemoryArticleStore::new()));

        let articles = service.list(Category::Technology, 2).await;
        assert!(articles.len() <= 2);
        assert!(!articles.is_empty());
        assert!(articles.iter().all(|a| a.category == Category::Technology));

        let all = service.list(Category::General, 4).await;
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|p| p[0].published_at >= p[1].published_at));
        assert_eq!(all[0].id, "1");
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_transport_errors() {
        let (service, notifier) = service(Arc::new(BrokenStore));
        assert!(service.list(Category::General, 10).await.is_empty());
        assert_eq!(
            notifier.errors(),
            vec!["Failed to fetch news. Please try again.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let store = MemoryArticleStore::with_rows(vec![row("r1", 1, Some("health"))]).await;
        let (service, notifier) = service(Arc::new(store));

        let remote = service.get_by_id("r1").await.unwrap();
        assert_eq!(remote.category, Category::Health);

        // Only present in the built-in set.
        let sample = service.get_by_id("5").await.unwrap();
        assert_eq!(sample, find_sample("5").unwrap());

        assert!(service.get_by_id("missing").await.is_none());
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_reports_transport_errors() {
        let (service, notifier) = service(Arc::new(BrokenStore));
        assert!(service.get_by_id("1").await.is_none());
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_company() {
        let mut acme = row("a1", 2, Some("business"));
        acme.company_id = Some("acme".to_string());
        let store = MemoryArticleStore::with_rows(vec![acme, row("x1", 3, Some("business"))]).await;
        let (service, _) = service(Arc::new(store));

        let articles = service.list_for_company("acme", 10).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "a1");
        assert!(service.list_for_company("nobody", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_audio_clips_through_service() {
        let (service, notifier) = service(Arc::new(MemoryArticleStore::new()));
        assert!(service.audio_clip("1").await.is_none());

        let clip = NewAudioClip {
            article_id: "1".to_string(),
            audio_url: "https://cdn.example.com/1.mp3".to_string(),
            duration: 30.0,
        };
        let created = service.save_audio_clip(&clip).await.unwrap();
        assert_eq!(service.audio_clip("1").await, Some(created));
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_companies_and_clips_report_transport_errors() {
        let (service, notifier) = service(Arc::new(BrokenStore));
        assert!(service.companies().await.is_empty());
        assert!(service.audio_clip("1").await.is_none());
        let clip = NewAudioClip {
            article_id: "1".to_string(),
            audio_url: "u".to_string(),
            duration: 1.0,
        };
        assert!(service.save_audio_clip(&clip).await.is_none());
        assert_eq!(
            notifier.errors(),
            vec![
                "Failed to fetch companies".to_string(),
                "Failed to fetch audio clip".to_string(),
                "Failed to save audio clip".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_skips_unknown() {
        let (service, _) = service(Arc::new(MemoryArticleStore::new()));
        let ids = vec!["3".to_string(), "nope".to_string(), "1".to_string()];
        let articles = service.resolve(&ids).await;
        let got: Vec<_> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(got, vec!["3", "1"]);
    }
}

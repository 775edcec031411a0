use async_trait::async_trait;
use chrono::Utc;
use nv_core::{ArticleQuery, ArticleRow, ArticleStore, AudioClip, Company, NewAudioClip, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<ArticleRow>,
    companies: Vec<Company>,
    clips: Vec<AudioClip>,
}

impl MemoryStore {
    pub fn upsert(&mut self, row: ArticleRow) {
        if let Some(existing) = self.rows.iter_mut().find(|r| r.id == row.id) {
            *existing = row;
        } else {
            self.rows.push(row);
        }
    }

    pub fn query(&self, query: &ArticleQuery) -> Vec<ArticleRow> {
        let mut rows = self
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        rows.truncate(query.limit);
        rows
    }

    pub fn get(&self, id: &str) -> Option<ArticleRow> {
        self.rows.iter().find(|r| r.id == id).cloned()
    }

    pub fn add_company(&mut self, company: Company) {
        self.companies.retain(|c| c.id != company.id);
        self.companies.push(company);
        self.companies.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn companies(&self) -> Vec<Company> {
        self.companies.clone()
    }

    pub fn clip_for(&self, article_id: &str) -> Option<AudioClip> {
        self.clips.iter().find(|c| c.article_id == article_id).cloned()
    }

    pub fn add_clip(&mut self, clip: &NewAudioClip) -> AudioClip {
        let clip = AudioClip {
            id: Uuid::new_v4().to_string(),
            article_id: clip.article_id.clone(),
            audio_url: clip.audio_url.clone(),
            duration: clip.duration,
            created_at: Some(Utc::now()),
        };
        self.clips.push(clip.clone());
        clip
    }
}

/// Article store kept in process memory. Starts empty.
#[derive(Clone, Default)]
pub struct MemoryArticleStore {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_rows(rows: Vec<ArticleRow>) -> Self {
        let store = Self::new();
        for row in rows {
            store.insert(row).await;
        }
        store
    }

    /// Inserts `row`, replacing any row with the same id.
    pub async fn insert(&self, row: ArticleRow) {
        self.store.write().await.upsert(row);
    }

    pub async fn insert_company(&self, company: Company) {
        self.store.write().await.add_company(company);
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRow>> {
        Ok(self.store.read().await.query(query))
    }

    async fn fetch_article(&self, id: &str) -> Result<Option<ArticleRow>> {
        Ok(self.store.read().await.get(id))
    }

    async fn fetch_companies(&self) -> Result<Vec<Company>> {
        Ok(self.store.read().await.companies())
    }

    async fn fetch_audio_clip(&self, article_id: &str) -> Result<Option<AudioClip>> {
        Ok(self.store.read().await.clip_for(article_id))
    }

    async fn create_audio_clip(&self, clip: &NewAudioClip) -> Result<AudioClip> {
        Ok(self.store.write().await.add_clip(clip))
    }
}

use async_trait::async_trait;
use nv_core::{
    ArticleQuery, ArticleRow, ArticleStore, AudioClip, Company, Error, NewAudioClip, Result,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

const REST_PATH: &str = "rest/v1/";
const ARTICLES: &str = "articles";
const COMPANIES: &str = "companies";
const AUDIO_CLIPS: &str = "audio_clips";

/// Article store backed by a hosted PostgREST API (Supabase).
pub struct RestArticleStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestArticleStore {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, table: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(REST_PATH)
            .and_then(|rest| rest.join(table))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>> {
        let rows = self
            .authorized(self.client.get(self.endpoint(table)?))
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;
        Ok(rows)
    }
}

impl fmt::Debug for RestArticleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestArticleStore")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// PostgREST query parameters for a list request.
pub fn list_params(query: &ArticleQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "published_at.desc".to_string()),
        ("limit".to_string(), query.limit.to_string()),
    ];
    if let Some(category) = query.category {
        params.push(("category".to_string(), format!("eq.{}", category)));
    }
    if let Some(company) = &query.company_id {
        params.push(("company_id".to_string(), format!("eq.{}", company)));
    }
    params
}

/// Parameters selecting at most one row whose `column` equals `value`.
/// An empty result stands for "no such row".
pub fn lookup_params(column: &str, value: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        (column.to_string(), format!("eq.{}", value)),
        ("limit".to_string(), "1".to_string()),
    ]
}

pub fn company_params() -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "name.asc".to_string()),
    ]
}

#[async_trait]
impl ArticleStore for RestArticleStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRow>> {
        self.get_rows(ARTICLES, &list_params(query)).await
    }

    async fn fetch_article(&self, id: &str) -> Result<Option<ArticleRow>> {
        let rows = self.get_rows(ARTICLES, &lookup_params("id", id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_companies(&self) -> Result<Vec<Company>> {
        self.get_rows(COMPANIES, &company_params()).await
    }

    async fn fetch_audio_clip(&self, article_id: &str) -> Result<Option<AudioClip>> {
        let rows = self
            .get_rows(AUDIO_CLIPS, &lookup_params("article_id", article_id))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_audio_clip(&self, clip: &NewAudioClip) -> Result<AudioClip> {
        let created = self
            .authorized(self.client.post(self.endpoint(AUDIO_CLIPS)?))
            .header("Prefer", "return=representation")
            .json(clip)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<AudioClip>>()
            .await?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| Error::Storage("audio clip insert returned no row".to_string()))
    }
}

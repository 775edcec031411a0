use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use nv_core::{
    ArticleQuery, ArticleRow, ArticleStore, AudioClip, Company, Error, NewAudioClip, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        company_id TEXT,
        title TEXT NOT NULL,
        description TEXT,
        content TEXT NOT NULL,
        url TEXT,
        image_url TEXT,
        published_at TEXT NOT NULL,
        category TEXT,
        created_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS articles_published_at ON articles (published_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        logo_url TEXT,
        created_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audio_clips (
        id TEXT PRIMARY KEY,
        article_id TEXT NOT NULL,
        audio_url TEXT NOT NULL,
        duration REAL NOT NULL,
        created_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS audio_clips_article_id ON audio_clips (article_id)",
];

pub struct SqliteArticleStore {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

/// Timestamps are stored in one fixed format so text order is time order.
fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date {}: {}", value, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<ArticleRow> {
    let created_at = optional_timestamp(row)?;
    Ok(ArticleRow {
        id: row.get("id"),
        company_id: row.get("company_id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        url: row.get("url"),
        image_url: row.get("image_url"),
        published_at: parse_timestamp(&row.get::<String, _>("published_at"))?,
        category: row.get("category"),
        created_at,
    })
}

fn optional_timestamp(row: &SqliteRow) -> Result<Option<DateTime<Utc>>> {
    row.get::<Option<String>, _>("created_at")
        .map(|t| parse_timestamp(&t))
        .transpose()
}

fn row_to_company(row: &SqliteRow) -> Result<Company> {
    Ok(Company {
        id: row.get("id"),
        name: row.get("name"),
        logo_url: row.get("logo_url"),
        created_at: optional_timestamp(row)?,
    })
}

fn row_to_clip(row: &SqliteRow) -> Result<AudioClip> {
    Ok(AudioClip {
        id: row.get("id"),
        article_id: row.get("article_id"),
        audio_url: row.get("audio_url"),
        duration: row.get("duration"),
        created_at: optional_timestamp(row)?,
    })
}

impl SqliteArticleStore {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn insert_article(&self, row: &ArticleRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO articles
            (id, company_id, title, description, content, url, image_url, published_at, category, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(row.company_id.as_deref())
        .bind(&row.title)
        .bind(row.description.as_deref())
        .bind(&row.content)
        .bind(row.url.as_deref())
        .bind(row.image_url.as_deref())
        .bind(timestamp(&row.published_at))
        .bind(row.category.as_deref())
        .bind(row.created_at.as_ref().map(timestamp))
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to store article", e))?;
        Ok(())
    }

    pub async fn insert_company(&self, company: &Company) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO companies (id, name, logo_url, created_at) VALUES (?, ?, ?, ?)")
            .bind(&company.id)
            .bind(&company.name)
            .bind(company.logo_url.as_deref())
            .bind(company.created_at.as_ref().map(timestamp))
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to store company", e))?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<ArticleRow>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE (?1 IS NULL OR category = ?1)
              AND (?2 IS NULL OR company_id = ?2)
            ORDER BY published_at DESC
            LIMIT ?3
            "#,
        )
        .bind(query.category.map(|c| c.as_str()))
        .bind(query.company_id.as_deref())
        .bind(query.limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch articles", e))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn fetch_article(&self, id: &str) -> Result<Option<ArticleRow>> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch article", e))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn fetch_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT * FROM companies ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch companies", e))?;

        rows.iter().map(row_to_company).collect()
    }

    async fn fetch_audio_clip(&self, article_id: &str) -> Result<Option<AudioClip>> {
        let row = sqlx::query("SELECT * FROM audio_clips WHERE article_id = ? ORDER BY created_at LIMIT 1")
            .bind(article_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch audio clip", e))?;

        row.as_ref().map(row_to_clip).transpose()
    }

    async fn create_audio_clip(&self, clip: &NewAudioClip) -> Result<AudioClip> {
        let created = AudioClip {
            id: Uuid::new_v4().to_string(),
            article_id: clip.article_id.clone(),
            audio_url: clip.audio_url.clone(),
            duration: clip.duration,
            created_at: Some(Utc::now().trunc_subsecs(6)),
        };
        sqlx::query(
            "INSERT INTO audio_clips (id, article_id, audio_url, duration, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&created.id)
        .bind(&created.article_id)
        .bind(&created.audio_url)
        .bind(created.duration)
        .bind(created.created_at.as_ref().map(timestamp))
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("Failed to save audio clip", e))?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nv_core::Category;
    use tempfile::tempdir;

    fn row(id: &str, hour: u32, category: &str) -> ArticleRow {
        ArticleRow {
            id: id.to_string(),
            company_id: Some("acme".to_string()),
            title: format!("Article {}", id),
            description: Some("Short".to_string()),
            content: "Body".to_string(),
            url: None,
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0).unwrap(),
            category: Some(category.to_string()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");
        let store = SqliteArticleStore::new_with_path(&db_path).await.unwrap();

        store.insert_article(&row("a", 8, "technology")).await.unwrap();
        store.insert_article(&row("b", 10, "technology")).await.unwrap();
        store.insert_article(&row("c", 9, "sports")).await.unwrap();

        let query = ArticleQuery::new(5).with_category(Category::Technology);
        let rows = store.fetch_articles(&query).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let rows = store.fetch_articles(&ArticleQuery::new(2)).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let found = store.fetch_article("c").await.unwrap().unwrap();
        assert_eq!(found, row("c", 9, "sports"));
        assert!(store.fetch_article("zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_companies_and_clips() {
        let temp_dir = tempdir().unwrap();
        let store = SqliteArticleStore::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        for (id, name) in [("2", "Zenith Daily"), ("1", "Acme News")] {
            let company = Company {
                id: id.to_string(),
                name: name.to_string(),
                logo_url: None,
                created_at: None,
            };
            store.insert_company(&company).await.unwrap();
        }
        let names: Vec<_> = store
            .fetch_companies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Acme News", "Zenith Daily"]);

        assert!(store.fetch_audio_clip("a").await.unwrap().is_none());
        let created = store
            .create_audio_clip(&NewAudioClip {
                article_id: "a".to_string(),
                audio_url: "file:///tmp/a.wav".to_string(),
                duration: 3.25,
            })
            .await
            .unwrap();
        assert_eq!(store.fetch_audio_clip("a").await.unwrap(), Some(created));
    }
}

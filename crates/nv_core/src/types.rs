use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Also used as the "All Categories" filter.
    #[default]
    General,
    Business,
    Technology,
    Entertainment,
    Sports,
    Science,
    Health,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Technology,
        Category::Entertainment,
        Category::Sports,
        Category::Science,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Entertainment => "entertainment",
            Category::Sports => "sports",
            Category::Science => "science",
            Category::Health => "health",
        }
    }

    /// Human readable label shown in category pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "All Categories",
            Category::Business => "Business",
            Category::Technology => "Technology",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
            Category::Science => "Science",
            Category::Health => "Health",
        }
    }

    /// Returns true when this category means "do not filter".
    pub fn is_all(&self) -> bool {
        matches!(self, Category::General)
    }

    /// Filter value to push down to a store, `None` for the sentinel.
    pub fn as_filter(&self) -> Option<Category> {
        if self.is_all() {
            None
        } else {
            Some(*self)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .find(|c| c.as_str() == wanted)
            .copied()
            .ok_or_else(|| Error::Config(format!("Unknown category: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
    pub url: String,
}

/// Article as displayed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    pub source: ArticleSource,
    pub category: Category,
}

/// Article row as stored by the remote data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRow {
    pub id: String,
    #[serde(default)]
    pub company_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Publisher an article can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pre-rendered narration of an article. `duration` is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub id: String,
    pub article_id: String,
    pub audio_url: String,
    pub duration: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Audio clip before the store assigned its id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAudioClip {
    pub article_id: String,
    pub audio_url: String,
    pub duration: f64,
}

/// Parameters of an article list query. Results are always ordered by
/// publication time, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub category: Option<Category>,
    pub company_id: Option<String>,
    pub limit: usize,
}

impl ArticleQuery {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(limit: usize) -> Self {
        Self {
            category: None,
            company_id: None,
            limit,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category.as_filter();
        self
    }

    pub fn with_company(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    /// Returns true if `row` passes the category and company filters.
    pub fn matches(&self, row: &ArticleRow) -> bool {
        if let Some(category) = self.category {
            if row.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(company) = &self.company_id {
            if row.company_id.as_ref() != Some(company) {
                return false;
            }
        }
        true
    }
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

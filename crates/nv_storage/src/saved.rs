use nv_core::{KeyValueStore, Notifier, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub const SAVED_ARTICLES_KEY: &str = "savedArticles";
pub const VISITED_KEY: &str = "hasVisitedNewsVoice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveOutcome {
    Saved,
    Removed,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// Ordered, duplicate-free list of saved article ids.
#[derive(Clone)]
pub struct SavedArticles {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl SavedArticles {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn ids(&self) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(SAVED_ARTICLES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                let mut unique: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                Ok(unique)
            }
            Err(e) => {
                warn!("Ignoring unreadable saved articles ({}): {}", e, raw);
                Ok(Vec::new())
            }
        }
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.ids()?.iter().any(|saved| saved == id))
    }

    /// Adds `id` if absent, removes it otherwise.
    pub fn toggle(&self, id: &str) -> Result<SaveOutcome> {
        let mut ids = self.ids()?;
        let outcome = match ids.iter().position(|saved| saved == id) {
            Some(index) => {
                ids.remove(index);
                SaveOutcome::Removed
            }
            None => {
                ids.push(id.to_string());
                SaveOutcome::Saved
            }
        };

        if let Err(e) = self.write(&ids) {
            warn!("Failed to persist saved articles: {}", e);
            self.notifier.error("Failed to update saved articles");
            return Err(e);
        }

        match outcome {
            SaveOutcome::Saved => self.notifier.success("Article saved successfully"),
            SaveOutcome::Removed => self.notifier.success("Article removed from saved"),
        }
        Ok(outcome)
    }

    fn write(&self, ids: &[String]) -> Result<()> {
        self.store.set(SAVED_ARTICLES_KEY, &serde_json::to_string(ids)?)
    }
}

/// "Has visited before" marker.
#[derive(Clone)]
pub struct VisitFlag {
    store: Arc<dyn KeyValueStore>,
}

impl VisitFlag {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// True on the first call for a store, false afterwards.
    pub fn check_first_visit(&self) -> Result<bool> {
        if self.store.get(VISITED_KEY)?.is_some() {
            return Ok(false);
        }
        self.store.set(VISITED_KEY, "true")?;
        Ok(true)
    }
}

pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier};
pub use storage::{ArticleStore, KeyValueStore};
pub use types::{
    Article, ArticleQuery, ArticleRow, ArticleSource, AudioClip, Category, Company, NewAudioClip,
};

pub mod prelude {
    pub use super::{Article, ArticleStore, Category, Error, KeyValueStore, Notifier, Result};
}

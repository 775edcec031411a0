pub mod memory;
pub mod rest;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryArticleStore;
pub use rest::RestArticleStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteArticleStore;

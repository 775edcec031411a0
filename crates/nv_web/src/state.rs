use nv_news::NewsService;
use nv_storage::SavedArticles;

pub struct AppState {
    pub news: NewsService,
    pub saved: SavedArticles,
}

impl AppState {
    pub fn new(news: NewsService, saved: SavedArticles) -> Self {
        Self { news, saved }
    }
}

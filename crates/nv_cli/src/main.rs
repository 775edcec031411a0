use clap::Parser;
use nv_core::logging::{init_logging, parse_level};
use nv_core::{Category, Config, KeyValueStore, LogNotifier, Notifier, Result};
use nv_news::{narration_text, NarrationScope, NewsService};
use nv_speech::engines::create_engine;
use nv_speech::{find_voice, PlaybackManager, PlaybackOptions, SpeechEngine};
use nv_storage::{FileKeyValueStore, SaveOutcome, SavedArticles, VisitFlag};
use std::io::BufRead;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

mod render;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(author, version, about = "Read the news out loud", long_about = None)]
pub struct Cli {
    /// Article store: rest (hosted), memory or sqlite
    #[arg(long, default_value = "rest")]
    store: String,
    /// Base URL of the hosted store (overrides NEWSVOICE_STORE_URL)
    #[arg(long)]
    store_url: Option<String>,
    /// API key of the hosted store (overrides NEWSVOICE_STORE_KEY)
    #[arg(long)]
    store_key: Option<String>,
    /// Directory holding saved articles and settings (overrides NEWSVOICE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show the latest articles
    List {
        #[arg(long, default_value = "general")]
        category: Category,
        /// Only articles of this company
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// List the companies publishing articles
    Companies,
    /// Show one article
    Show { id: String },
    /// Read an article aloud. Type p + Enter to pause or resume, s + Enter to stop.
    Read {
        id: String,
        /// Read the title and description only
        #[arg(long)]
        summary: bool,
        #[arg(long)]
        voice: Option<String>,
        #[arg(long)]
        rate: Option<f32>,
        #[arg(long)]
        pitch: Option<f32>,
        /// Speech engine: command (espeak-ng) or simulated
        #[arg(long, default_value = "command")]
        engine: String,
    },
    /// List the voices of a speech engine
    Voices {
        #[arg(long, default_value = "command")]
        engine: String,
    },
    /// Save or unsave an article
    Save { id: String },
    /// List saved articles
    Saved,
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

fn load_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(url) = &cli.store_url {
        config = config.with_store_url(url.clone());
    }
    if let Some(key) = &cli.store_key {
        config = config.with_store_key(key.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    config
}

fn welcome(settings: &Arc<dyn KeyValueStore>) {
    match VisitFlag::new(settings.clone()).check_first_visit() {
        Ok(true) => {
            println!("👋 Welcome to NewsVoice, your news read aloud in a natural voice.");
            println!("   Run `nv read <id>` to listen to an article and `nv save <id>` to keep it for later.\n");
        }
        Ok(false) => {}
        Err(e) => warn!("Failed to check first visit: {}", e),
    }
}

enum Control {
    TogglePause,
    Stop,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim() {
        "p" | "pause" | "r" | "resume" => Some(Control::TogglePause),
        "s" | "stop" | "q" => Some(Control::Stop),
        _ => None,
    }
}

/// Forwards stdin lines from a detached thread. A blocking read cannot be
/// cancelled, so it must not hold up runtime shutdown once playback ends.
fn stdin_lines() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("Stopped reading stdin");
    });
    rx
}

/// Drives playback until the utterance ends or is stopped. Control
/// commands arrive line by line on `input`.
async fn play<E: SpeechEngine>(
    manager: &mut PlaybackManager<E>,
    text: &str,
    title: &str,
    mut input: UnboundedReceiver<String>,
) {
    manager.speak(text);
    manager.process_events();

    let mut input_open = true;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_state = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                manager.process_events();
                let state = manager.status().state();
                if last_state != Some(state) {
                    println!("{}", render::playback_line(state, title));
                    last_state = Some(state);
                }
                if manager.active().is_none() {
                    break;
                }
            }
            line = input.recv(), if input_open => match line {
                Some(line) => match parse_control(&line) {
                    Some(Control::TogglePause) => manager.toggle(text),
                    Some(Control::Stop) => manager.stop(),
                    None => println!("p = pause/resume, s = stop"),
                },
                // Input closed, keep playing until the end.
                None => input_open = false,
            },
            _ = &mut ctrl_c => {
                manager.stop();
                break;
            }
        }
    }
}

/// Unsaving works on the id alone. Saving needs the article to exist.
/// Returns `None` when there is no such article to save.
async fn toggle_saved(
    news: &NewsService,
    saved: &SavedArticles,
    id: &str,
) -> Result<Option<SaveOutcome>> {
    if !saved.contains(id)? && news.get_by_id(id).await.is_none() {
        return Ok(None);
    }
    saved.toggle(id).map(Some)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(parse_level(&cli.log_level));

    let config = load_config(&cli);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let settings: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(config.settings_path()));
    let store = nv_storage::create_store(&cli.store, &config).await?;
    info!("💾 Article store initialized (using {})", store.name());

    let news = NewsService::new(store, notifier.clone());
    let saved = SavedArticles::new(settings.clone(), notifier.clone());
    welcome(&settings);

    match cli.command {
        Commands::List {
            category,
            company,
            count,
        } => {
            let saved_ids = saved.ids()?;
            let articles = match company {
                Some(company) => news.list_for_company(&company, count).await,
                None => news.list(category, count).await,
            };
            if articles.is_empty() {
                println!("No articles found. Try changing the category or check back later.");
            }
            for article in &articles {
                println!("{}\n", render::card(article, saved_ids.contains(&article.id)));
            }
        }
        Commands::Companies => {
            let companies = news.companies().await;
            if companies.is_empty() {
                println!("No companies found.");
            }
            for company in &companies {
                println!("{}", render::company_line(company));
            }
        }
        Commands::Show { id } => match news.get_by_id(&id).await {
            Some(article) => print!("{}", render::detail(&article, saved.contains(&article.id)?)),
            None => println!("Article not found"),
        },
        Commands::Read {
            id,
            summary,
            voice,
            rate,
            pitch,
            engine,
        } => {
            let Some(article) = news.get_by_id(&id).await else {
                println!("Article not found");
                return Ok(());
            };
            let options = PlaybackOptions {
                voice: None,
                rate,
                pitch,
            };
            let mut manager = PlaybackManager::new(create_engine(&engine)?, notifier.clone(), options);
            if let Some(name) = voice {
                match find_voice(manager.voices(), &name).cloned() {
                    Some(found) => manager.set_voice(found),
                    None => warn!("Voice {} not found, keeping {:?}", name, manager.current_voice()),
                }
            }
            let scope = if summary {
                NarrationScope::Summary
            } else {
                NarrationScope::Full
            };
            let text = narration_text(&article, scope);
            play(&mut manager, &text, &article.title, stdin_lines()).await;
        }
        Commands::Voices { engine } => {
            let manager = PlaybackManager::new(create_engine(&engine)?, notifier.clone(), PlaybackOptions::default());
            if manager.voices().is_empty() {
                println!("No voices reported by {}", manager.engine().name());
            }
            for voice in manager.voices() {
                let selected = manager.current_voice() == Some(voice);
                println!("{}", render::voice_line(voice, selected));
            }
        }
        Commands::Save { id } => match toggle_saved(&news, &saved, &id).await? {
            Some(SaveOutcome::Saved) => println!("🔖 Saved {}", id),
            Some(SaveOutcome::Removed) => println!("🗑️  Removed {}", id),
            None => println!("Article not found"),
        },
        Commands::Saved => {
            let ids = saved.ids()?;
            if ids.is_empty() {
                println!("No saved articles yet.");
            }
            for article in news.resolve(&ids).await {
                println!("{}\n", render::card(&article, true));
            }
        }
        Commands::Serve { addr } => {
            nv_web::serve(nv_web::AppState::new(news, saved), addr).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_read_command() {
        let cli = Cli::try_parse_from([
            "nv", "--store", "memory", "read", "3", "--rate", "1.5", "--engine", "simulated",
        ])
        .unwrap();
        match cli.command {
            Commands::Read { id, rate, engine, summary, .. } => {
                assert_eq!(id, "3");
                assert_eq!(rate, Some(1.5));
                assert_eq!(engine, "simulated");
                assert!(!summary);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_category() {
        let cli = Cli::try_parse_from(["nv", "list", "--category", "sports"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List { category: Category::Sports, company: None, count: 10 }
        ));
        assert!(Cli::try_parse_from(["nv", "list", "--category", "weather"]).is_err());
    }

    #[test]
    fn test_parse_control() {
        assert!(matches!(parse_control("p\n"), Some(Control::TogglePause)));
        assert!(matches!(parse_control(" stop "), Some(Control::Stop)));
        assert!(parse_control("x").is_none());
    }

    fn lines(input: &[&str]) -> (mpsc::UnboundedSender<String>, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in input {
            tx.send(line.to_string()).unwrap();
        }
        (tx, rx)
    }

    #[tokio::test]
    async fn test_play_with_simulated_engine() {
        let notifier: Arc<dyn Notifier> = Arc::new(nv_core::RecordingNotifier::new());
        let mut manager =
            PlaybackManager::new(create_engine("simulated").unwrap(), notifier, PlaybackOptions::default());
        let (tx, rx) = lines(&[]);
        drop(tx);
        play(&mut manager, "Hello there", "Greeting", rx).await;
        assert!(!manager.is_speaking());
        assert!(manager.active().is_none());
    }

    #[tokio::test]
    async fn test_play_returns_while_input_stays_open() {
        let notifier: Arc<dyn Notifier> = Arc::new(nv_core::RecordingNotifier::new());
        let mut manager =
            PlaybackManager::new(create_engine("simulated").unwrap(), notifier, PlaybackOptions::default());
        let (_tx, rx) = lines(&[]);
        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            play(&mut manager, "Hello there", "Greeting", rx),
        )
        .await;
        assert!(finished.is_ok());
        assert!(manager.active().is_none());
    }

    #[tokio::test]
    async fn test_play_stop_command() {
        let notifier: Arc<dyn Notifier> = Arc::new(nv_core::RecordingNotifier::new());
        let engine = nv_speech::SimulatedEngine::new(Vec::new()).with_auto_start();
        let monitor = engine.monitor();
        let mut manager = PlaybackManager::new(engine, notifier, PlaybackOptions::default());
        let (_tx, rx) = lines(&["p", "s"]);
        play(&mut manager, "A long story", "Story", rx).await;
        assert!(!manager.is_speaking());
        assert!(!manager.is_paused());
        assert_eq!(monitor.cancel_count(), 1);
    }

    #[tokio::test]
    async fn test_unsave_without_article() {
        let notifier: Arc<dyn Notifier> = Arc::new(nv_core::RecordingNotifier::new());
        let news = NewsService::new(Arc::new(nv_storage::MemoryArticleStore::new()), notifier.clone());
        let settings = Arc::new(nv_storage::MemoryKeyValueStore::new());
        settings
            .set(nv_storage::saved::SAVED_ARTICLES_KEY, "[\"gone\"]")
            .unwrap();
        let saved = SavedArticles::new(settings, notifier);

        let outcome = toggle_saved(&news, &saved, "gone").await.unwrap();
        assert_eq!(outcome, Some(SaveOutcome::Removed));
        assert!(saved.ids().unwrap().is_empty());

        assert_eq!(toggle_saved(&news, &saved, "gone").await.unwrap(), None);
        assert_eq!(toggle_saved(&news, &saved, "2").await.unwrap(), Some(SaveOutcome::Saved));
    }
}

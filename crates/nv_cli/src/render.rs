use nv_core::{Article, Company};
use nv_speech::{PlaybackState, Voice};

pub fn format_date(article: &Article) -> String {
    article.published_at.format("%B %-d, %Y").to_string()
}

/// One feed card: headline line plus description.
pub fn card(article: &Article, saved: bool) -> String {
    let marker = if saved { "🔖" } else { "  " };
    format!(
        "{} [{}] {} · {}\n     {} · {}\n     {}",
        marker,
        article.id,
        article.category,
        article.title,
        format_date(article),
        article.source.name,
        article.description
    )
}

/// Full article page.
pub fn detail(article: &Article, saved: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", article.category));
    out.push_str(&format!("{}\n", article.title));
    out.push_str(&format!("{} · {}\n\n", format_date(article), article.source.name));
    out.push_str(&format!("{}\n", article.description));
    out.push_str("────────────────────────────────────────\n");
    for paragraph in article.content.split("\n\n") {
        out.push_str(paragraph.trim());
        out.push_str("\n\n");
    }
    if !article.url.is_empty() {
        out.push_str(&format!("View original: {}\n", article.url));
    }
    out.push_str(if saved { "Saved\n" } else { "Not saved\n" });
    out
}

pub fn company_line(company: &Company) -> String {
    match &company.logo_url {
        Some(logo) => format!("[{}] {} ({})", company.id, company.name, logo),
        None => format!("[{}] {}", company.id, company.name),
    }
}

pub fn voice_line(voice: &Voice, selected: bool) -> String {
    format!(
        "{} {} ({}{})",
        if selected { "▶" } else { " " },
        voice.name,
        voice.locale,
        if voice.local_service { "" } else { ", network" }
    )
}

pub fn playback_line(state: PlaybackState, title: &str) -> String {
    match state {
        PlaybackState::Idle => format!("⏹️  Stopped: {}", title),
        PlaybackState::Speaking => format!("🔊 Reading: {}", title),
        PlaybackState::Paused => format!("⏸️  Paused: {}", title),
    }
}

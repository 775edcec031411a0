use serde::{Deserialize, Serialize};

/// Voice names that sound natural enough to be picked by default.
pub const PREFERRED_VOICE_NAMES: &[&str] = &["Daniel", "Samantha"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag as reported by the engine, e.g. `en-GB`.
    pub locale: String,
    /// False when synthesis needs the network.
    pub local_service: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, locale: impl Into<String>, local_service: bool) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
            local_service,
        }
    }

    pub fn is_english(&self) -> bool {
        self.locale.to_lowercase().contains("en")
    }
}

/// Picks the voice used when the user has not chosen one.
///
/// A preferred name wins over an English local voice, which wins over
/// the first voice in engine order.
pub fn select_default_voice(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .find(|v| PREFERRED_VOICE_NAMES.iter().any(|name| v.name.contains(name)))
        .or_else(|| voices.iter().find(|v| v.is_english() && v.local_service))
        .or_else(|| voices.first())
}

/// Looks a voice up by exact name, then by case-insensitive substring.
pub fn find_voice<'a>(voices: &'a [Voice], name: &str) -> Option<&'a Voice> {
    let needle = name.to_lowercase();
    voices
        .iter()
        .find(|v| v.name == name)
        .or_else(|| voices.iter().find(|v| v.name.to_lowercase().contains(&needle)))
}

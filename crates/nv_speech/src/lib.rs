use nv_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub mod engines;
pub mod manager;
pub mod voice;

pub use engines::{CommandEngine, SimulatedEngine};
pub use manager::{PlaybackManager, PlaybackOptions, PlaybackState, PlaybackStatus};
pub use voice::{find_voice, select_default_voice, Voice, PREFERRED_VOICE_NAMES};

/// Generation token issued for every utterance. Events carrying an id other
/// than the active one are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One request to speak `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Lifecycle notifications emitted by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
    Failed { id: UtteranceId, message: String },
    VoicesChanged,
}

/// Sending half of a manager's event channel.
#[derive(Debug, Clone)]
pub struct EngineEvents {
    tx: UnboundedSender<EngineEvent>,
}

impl EngineEvents {
    pub fn channel() -> (Self, UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Dropping engine event, playback manager is gone");
        }
    }
}

/// Platform text-to-speech facility driven by a [`PlaybackManager`].
///
/// Commands are fire-and-forget. Their outcome is only observable through
/// the [`EngineEvent`]s sent on the channel handed over by [`attach`].
///
/// [`attach`]: SpeechEngine::attach
pub trait SpeechEngine: Send {
    fn name(&self) -> &str;

    fn attach(&mut self, events: EngineEvents);

    /// Starts speaking. An error here means the utterance never started.
    fn submit(&mut self, utterance: Utterance) -> Result<()>;

    /// Drops the current utterance, if any.
    fn cancel(&mut self);

    fn pause_active(&mut self) -> Result<()>;

    fn resume_active(&mut self) -> Result<()>;

    /// True while an utterance is producing or holding audio, paused included.
    fn is_active(&self) -> bool;

    fn is_paused(&self) -> bool;

    fn list_voices(&self) -> Vec<Voice>;

    /// Lets engines that watch external resources emit pending events.
    fn poll(&mut self) {}
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn attach(&mut self, events: EngineEvents) {
        (**self).attach(events)
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        (**self).submit(utterance)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn pause_active(&mut self) -> Result<()> {
        (**self).pause_active()
    }

    fn resume_active(&mut self) -> Result<()> {
        (**self).resume_active()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn list_voices(&self) -> Vec<Voice> {
        (**self).list_voices()
    }

    fn poll(&mut self) {
        (**self).poll()
    }
}

pub mod prelude {
    pub use super::{
        EngineEvent, EngineEvents, PlaybackManager, PlaybackOptions, SpeechEngine, Utterance,
        UtteranceId, Voice,
    };
    pub use nv_core::{Error, Result};
}

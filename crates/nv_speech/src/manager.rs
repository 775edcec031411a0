use std::sync::Arc;

use nv_core::Notifier;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::voice::{select_default_voice, Voice};
use crate::{EngineEvent, EngineEvents, SpeechEngine, Utterance, UtteranceId};

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;
pub const MIN_SETTING: f32 = 0.5;
pub const MAX_SETTING: f32 = 2.0;

const SPEECH_FAILED: &str = "Speech synthesis failed. Please try again.";
const START_FAILED: &str = "Failed to start speech. Please try again.";

/// Settings applied when the manager is created.
#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    pub voice: Option<Voice>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

/// Observable playback flags. `paused` implies `speaking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackStatus {
    pub speaking: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
}

impl PlaybackStatus {
    pub fn state(&self) -> PlaybackState {
        match (self.speaking, self.paused) {
            (true, true) => PlaybackState::Paused,
            (true, false) => PlaybackState::Speaking,
            _ => PlaybackState::Idle,
        }
    }
}

/// Owns the speech state of one view and keeps it in step with the engine.
///
/// Engine notifications are queued on a channel and only applied when
/// [`process_events`](Self::process_events) drains it.
pub struct PlaybackManager<E: SpeechEngine> {
    engine: E,
    events: UnboundedReceiver<EngineEvent>,
    notifier: Arc<dyn Notifier>,
    voices: Vec<Voice>,
    voice: Option<Voice>,
    rate: f32,
    pitch: f32,
    status: PlaybackStatus,
    active: Option<UtteranceId>,
    next_id: u64,
}

impl<E: SpeechEngine> PlaybackManager<E> {
    pub fn new(mut engine: E, notifier: Arc<dyn Notifier>, options: PlaybackOptions) -> Self {
        let (sender, events) = EngineEvents::channel();
        engine.attach(sender);

        let mut manager = Self {
            engine,
            events,
            notifier,
            voices: Vec::new(),
            voice: options.voice,
            rate: options.rate.map(clamp_setting).unwrap_or(DEFAULT_RATE),
            pitch: options.pitch.map(clamp_setting).unwrap_or(DEFAULT_PITCH),
            status: PlaybackStatus::default(),
            active: None,
            next_id: 0,
        };
        manager.load_voices();
        manager
    }

    /// Replaces whatever is playing with `text`.
    ///
    /// If the engine rejects the new utterance the flags are left as they
    /// were, so a replaced utterance keeps reporting `speaking` with nothing
    /// active until the next `stop` or `speak`.
    pub fn speak(&mut self, text: &str) {
        if self.engine.is_active() {
            debug!("Cancelling {:?} before speaking again", self.active);
            self.engine.cancel();
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        let utterance = Utterance {
            id,
            text: text.to_string(),
            voice: self.voice.clone(),
            rate: self.rate,
            pitch: self.pitch,
        };

        self.active = Some(id);
        debug!(
            "Submitting utterance {} ({} chars, rate {}, pitch {})",
            id,
            text.len(),
            self.rate,
            self.pitch
        );
        if let Err(e) = self.engine.submit(utterance) {
            warn!("Error starting speech on {}: {}", self.engine.name(), e);
            self.notifier.error(START_FAILED);
            self.active = None;
        }
    }

    pub fn pause(&mut self) {
        if !(self.engine.is_active() && self.status.speaking && !self.status.paused) {
            return;
        }
        match self.engine.pause_active() {
            Ok(()) => self.status.paused = true,
            Err(e) => warn!("Engine refused to pause: {}", e),
        }
    }

    pub fn resume(&mut self) {
        if !(self.engine.is_active() && self.status.paused) {
            return;
        }
        match self.engine.resume_active() {
            Ok(()) => self.status.paused = false,
            Err(e) => warn!("Engine refused to resume: {}", e),
        }
    }

    pub fn stop(&mut self) {
        self.status = PlaybackStatus::default();
        self.engine.cancel();
        self.active = None;
    }

    /// Pauses or resumes while speaking, otherwise starts `text`.
    pub fn toggle(&mut self, text: &str) {
        if self.status.speaking {
            if self.status.paused {
                self.resume();
            } else {
                self.pause();
            }
        } else {
            self.speak(text);
        }
    }

    pub fn set_voice(&mut self, voice: Voice) {
        self.voice = Some(voice);
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_setting(rate);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_setting(pitch);
    }

    /// Drains queued engine events and applies them in arrival order.
    pub fn process_events(&mut self) {
        self.engine.poll();
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::VoicesChanged => self.load_voices(),
            EngineEvent::Started(id) if self.is_current(id) => {
                self.status = PlaybackStatus {
                    speaking: true,
                    paused: false,
                };
            }
            EngineEvent::Ended(id) if self.is_current(id) => {
                self.status = PlaybackStatus::default();
                self.active = None;
            }
            EngineEvent::Failed { id, message } if self.is_current(id) => {
                warn!("TTS error on utterance {}: {}", id, message);
                self.notifier.error(SPEECH_FAILED);
                self.status = PlaybackStatus::default();
                self.active = None;
            }
            stale => debug!("Ignoring stale engine event {:?}", stale),
        }
    }

    fn is_current(&self, id: UtteranceId) -> bool {
        self.active == Some(id)
    }

    fn load_voices(&mut self) {
        self.voices = self.engine.list_voices();
        if self.voice.is_none() {
            if let Some(voice) = select_default_voice(&self.voices) {
                info!("🗣️ Default voice: {} ({})", voice.name, voice.locale);
                self.voice = Some(voice.clone());
            }
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.status.speaking
    }

    pub fn is_paused(&self) -> bool {
        self.status.paused
    }

    pub fn active(&self) -> Option<UtteranceId> {
        self.active
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn current_voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    pub fn current_rate(&self) -> f32 {
        self.rate
    }

    pub fn current_pitch(&self) -> f32 {
        self.pitch
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: SpeechEngine> Drop for PlaybackManager<E> {
    fn drop(&mut self) {
        if self.engine.is_active() {
            self.engine.cancel();
        }
    }
}

fn clamp_setting(value: f32) -> f32 {
    if value.is_nan() {
        return DEFAULT_RATE;
    }
    value.clamp(MIN_SETTING, MAX_SETTING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatedEngine;
    use nv_core::RecordingNotifier;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("X", "fr-FR", true),
            Voice::new("Daniel", "en-GB", false),
        ]
    }

    fn manager(engine: SimulatedEngine) -> (PlaybackManager<SimulatedEngine>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let manager = PlaybackManager::new(engine, notifier.clone(), PlaybackOptions::default());
        (manager, notifier)
    }

    fn assert_invariant(manager: &PlaybackManager<SimulatedEngine>) {
        let status = manager.status();
        assert!(!status.paused || status.speaking, "paused without speaking: {:?}", status);
    }

    /// Speaks and lets the engine report the start.
    fn start_speaking(manager: &mut PlaybackManager<SimulatedEngine>, text: &str) {
        manager.speak(text);
        manager.engine_mut().start();
        manager.process_events();
    }

    #[test]
    fn test_selects_default_voice_on_creation() {
        let (manager, _) = manager(SimulatedEngine::new(voices()));
        assert_eq!(manager.voices().len(), 2);
        assert_eq!(manager.current_voice().unwrap().name, "Daniel");
        assert_eq!(manager.current_rate(), DEFAULT_RATE);
        assert_eq!(manager.current_pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn test_options_override_defaults() {
        let notifier = Arc::new(RecordingNotifier::new());
        let options = PlaybackOptions {
            voice: Some(Voice::new("X", "fr-FR", true)),
            rate: Some(1.5),
            pitch: Some(9.0),
        };
        let manager = PlaybackManager::new(SimulatedEngine::new(voices()), notifier, options);
        assert_eq!(manager.current_voice().unwrap().name, "X");
        assert_eq!(manager.current_rate(), 1.5);
        assert_eq!(manager.current_pitch(), MAX_SETTING);
    }

    #[test]
    fn test_voices_loaded_late() {
        let (mut manager, _) = manager(SimulatedEngine::new(vec![]));
        assert!(manager.current_voice().is_none());

        manager.engine_mut().set_voices(voices());
        manager.process_events();
        assert_eq!(manager.current_voice().unwrap().name, "Daniel");

        // A later refresh keeps the existing choice.
        manager.engine_mut().set_voices(vec![Voice::new("Samantha", "en-US", true)]);
        manager.process_events();
        assert_eq!(manager.voices().len(), 1);
        assert_eq!(manager.current_voice().unwrap().name, "Daniel");
    }

    #[test]
    fn test_speak_lifecycle() {
        let (mut manager, notifier) = manager(SimulatedEngine::new(voices()));
        manager.speak("Hello. World");

        // Nothing observed until the engine reports the start.
        assert!(!manager.is_speaking());
        let submitted = manager.engine().submitted().last().cloned().unwrap();
        assert_eq!(submitted.text, "Hello. World");
        assert_eq!(submitted.voice.unwrap().name, "Daniel");

        manager.engine_mut().start();
        manager.process_events();
        assert_eq!(manager.status().state(), PlaybackState::Speaking);

        manager.engine_mut().finish();
        manager.process_events();
        assert_eq!(manager.status().state(), PlaybackState::Idle);
        assert!(manager.active().is_none());
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_pause_resume_keeps_invariant() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));

        // Nothing playing: both are no-ops.
        manager.pause();
        assert_invariant(&manager);
        manager.resume();
        assert_invariant(&manager);
        assert_eq!(manager.status(), PlaybackStatus::default());

        start_speaking(&mut manager, "text");
        for step in 0..6 {
            if step % 3 == 0 {
                manager.resume();
            } else {
                manager.pause();
            }
            assert_invariant(&manager);
        }

        manager.pause();
        assert_eq!(manager.status().state(), PlaybackState::Paused);
        assert!(manager.engine().is_paused());
        manager.pause();
        assert_eq!(manager.status().state(), PlaybackState::Paused);

        manager.resume();
        assert_eq!(manager.status().state(), PlaybackState::Speaking);
        assert!(!manager.engine().is_paused());
        assert_invariant(&manager);
    }

    #[test]
    fn test_pause_before_start_is_ignored() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));
        manager.speak("text");
        manager.pause();
        assert_invariant(&manager);
        assert!(!manager.is_paused());
    }

    #[test]
    fn test_speak_while_speaking_replaces_utterance() {
        let (mut manager, notifier) = manager(SimulatedEngine::new(voices()));
        start_speaking(&mut manager, "first");
        let first = manager.active().unwrap();

        manager.speak("second");
        let second = manager.active().unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.engine().cancel_count(), 1);
        assert_eq!(manager.engine().current().unwrap().text, "second");

        // The interrupted first utterance reports an error; it is stale.
        manager.process_events();
        assert!(notifier.errors().is_empty());
        assert_eq!(manager.active(), Some(second));

        manager.engine_mut().start();
        manager.process_events();
        assert!(manager.is_speaking());
    }

    #[test]
    fn test_stale_end_does_not_reset_new_utterance() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));
        start_speaking(&mut manager, "first");
        let first = manager.active().unwrap();
        start_speaking(&mut manager, "second");

        manager.handle_event(EngineEvent::Ended(first));
        assert!(manager.is_speaking());
        assert!(manager.active().is_some());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut manager, notifier) = manager(SimulatedEngine::new(voices()));
        manager.stop();
        assert_eq!(manager.status(), PlaybackStatus::default());

        start_speaking(&mut manager, "text");
        manager.pause();
        manager.stop();
        let once = manager.status();
        manager.stop();
        assert_eq!(manager.status(), once);
        assert_eq!(once, PlaybackStatus::default());
        assert!(manager.active().is_none());
        assert!(!manager.engine().is_active());

        // Cancellation callbacks arriving late change nothing.
        manager.process_events();
        assert_eq!(manager.status(), PlaybackStatus::default());
        assert!(notifier.errors().is_empty());
    }

    #[test]
    fn test_engine_error_resets_and_notifies() {
        let (mut manager, notifier) = manager(SimulatedEngine::new(voices()));
        start_speaking(&mut manager, "text");
        manager.pause();

        manager.engine_mut().fail("audio-busy");
        manager.process_events();
        assert_eq!(manager.status(), PlaybackStatus::default());
        assert!(manager.active().is_none());
        assert_eq!(notifier.errors(), vec![SPEECH_FAILED.to_string()]);

        // Retry works.
        start_speaking(&mut manager, "text");
        assert!(manager.is_speaking());
    }

    #[test]
    fn test_submission_error_leaves_state() {
        let (mut manager, notifier) = manager(SimulatedEngine::new(voices()));
        start_speaking(&mut manager, "first");
        let before = manager.status();

        manager.engine_mut().fail_submissions(true);
        manager.speak("second");
        assert_eq!(manager.status(), before);
        assert!(manager.active().is_none());
        assert_eq!(notifier.errors(), vec![START_FAILED.to_string()]);

        // The first utterance was cancelled: its events are stale and
        // pausing has nothing to act on.
        assert!(!manager.engine().is_active());
        manager.process_events();
        manager.pause();
        assert!(manager.is_speaking());
        assert!(!manager.is_paused());
        assert_invariant(&manager);

        manager.stop();
        assert_eq!(manager.status(), PlaybackStatus::default());

        manager.engine_mut().fail_submissions(false);
        start_speaking(&mut manager, "third");
        assert!(manager.is_speaking());
        assert!(manager.active().is_some());
    }

    #[test]
    fn test_settings_apply_to_next_utterance() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));
        start_speaking(&mut manager, "first");

        manager.set_rate(1.75);
        manager.set_pitch(0.8);
        manager.set_voice(Voice::new("X", "fr-FR", true));

        let in_flight = manager.engine().current().unwrap();
        assert_eq!(in_flight.rate, DEFAULT_RATE);
        assert_eq!(in_flight.pitch, DEFAULT_PITCH);
        assert_eq!(in_flight.voice.unwrap().name, "Daniel");
        assert!(manager.is_speaking());

        manager.speak("second");
        let next = manager.engine().current().unwrap();
        assert_eq!(next.rate, 1.75);
        assert_eq!(next.pitch, 0.8);
        assert_eq!(next.voice.unwrap().name, "X");
    }

    #[test]
    fn test_settings_are_clamped() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));
        manager.set_rate(0.1);
        assert_eq!(manager.current_rate(), MIN_SETTING);
        manager.set_pitch(f32::NAN);
        assert_eq!(manager.current_pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn test_toggle() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()));
        manager.toggle("text");
        manager.engine_mut().start();
        manager.process_events();
        assert_eq!(manager.status().state(), PlaybackState::Speaking);

        manager.toggle("text");
        assert_eq!(manager.status().state(), PlaybackState::Paused);
        manager.toggle("text");
        assert_eq!(manager.status().state(), PlaybackState::Speaking);
        assert_eq!(manager.engine().submitted().len(), 1);
    }

    #[test]
    fn test_auto_start_engine() {
        let (mut manager, _) = manager(SimulatedEngine::new(voices()).with_auto_start());
        manager.speak("text");
        manager.process_events();
        assert!(manager.is_speaking());
    }

    #[test]
    fn test_drop_cancels_engine() {
        let engine = SimulatedEngine::new(voices());
        let monitor = engine.monitor();
        {
            let (mut manager, _) = manager(engine);
            start_speaking(&mut manager, "text");
        }
        assert_eq!(monitor.cancel_count(), 1);
    }
}

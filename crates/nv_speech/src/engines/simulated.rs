use std::sync::{Arc, Mutex, MutexGuard};

use nv_core::{Error, Result};

use crate::{EngineEvent, EngineEvents, SpeechEngine, Utterance, Voice};

#[derive(Debug, Default)]
struct SimulatedState {
    voices: Vec<Voice>,
    current: Option<Utterance>,
    paused: bool,
    submitted: Vec<Utterance>,
    cancels: usize,
    fail_submissions: bool,
}

/// In-memory engine whose lifecycle is driven by the caller.
///
/// Nothing is ever audible. Submitted utterances are recorded and stay
/// active until [`finish`](Self::finish), [`fail`](Self::fail) or a cancel.
/// Cancelling reports an `interrupted` failure like browser engines do.
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    state: Arc<Mutex<SimulatedState>>,
    events: Option<EngineEvents>,
    auto_start: bool,
    auto_finish: bool,
}

/// Read-only view of a [`SimulatedEngine`] that outlives the engine.
#[derive(Debug, Clone)]
pub struct SimulatedMonitor {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedMonitor {
    pub fn cancel_count(&self) -> usize {
        lock(&self.state).cancels
    }

    pub fn submitted(&self) -> Vec<Utterance> {
        lock(&self.state).submitted.clone()
    }
}

impl SimulatedEngine {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                voices,
                ..Default::default()
            })),
            events: None,
            auto_start: false,
            auto_finish: false,
        }
    }

    /// Emits `Started` as soon as an utterance is submitted.
    pub fn with_auto_start(mut self) -> Self {
        self.auto_start = true;
        self
    }

    /// Ends the current utterance on the next [`poll`](SpeechEngine::poll).
    pub fn with_auto_finish(mut self) -> Self {
        self.auto_finish = true;
        self
    }

    pub fn monitor(&self) -> SimulatedMonitor {
        SimulatedMonitor {
            state: self.state.clone(),
        }
    }

    pub fn start(&mut self) {
        let id = lock(&self.state).current.as_ref().map(|u| u.id);
        if let Some(id) = id {
            self.emit(EngineEvent::Started(id));
        }
    }

    pub fn finish(&mut self) {
        let finished = {
            let mut state = lock(&self.state);
            state.paused = false;
            state.current.take()
        };
        if let Some(utterance) = finished {
            self.emit(EngineEvent::Ended(utterance.id));
        }
    }

    pub fn fail(&mut self, message: &str) {
        let failed = {
            let mut state = lock(&self.state);
            state.paused = false;
            state.current.take()
        };
        if let Some(utterance) = failed {
            self.emit(EngineEvent::Failed {
                id: utterance.id,
                message: message.to_string(),
            });
        }
    }

    /// Replaces the voice list and announces the change.
    pub fn set_voices(&mut self, voices: Vec<Voice>) {
        lock(&self.state).voices = voices;
        self.emit(EngineEvent::VoicesChanged);
    }

    pub fn fail_submissions(&mut self, fail: bool) {
        lock(&self.state).fail_submissions = fail;
    }

    pub fn current(&self) -> Option<Utterance> {
        lock(&self.state).current.clone()
    }

    pub fn submitted(&self) -> Vec<Utterance> {
        lock(&self.state).submitted.clone()
    }

    pub fn cancel_count(&self) -> usize {
        lock(&self.state).cancels
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

impl SpeechEngine for SimulatedEngine {
    fn name(&self) -> &str {
        "simulated"
    }

    fn attach(&mut self, events: EngineEvents) {
        self.events = Some(events);
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        let id = utterance.id;
        {
            let mut state = lock(&self.state);
            if state.fail_submissions {
                return Err(Error::Speech("simulated submission failure".to_string()));
            }
            state.submitted.push(utterance.clone());
            state.current = Some(utterance);
            state.paused = false;
        }
        tracing::debug!("Simulated engine accepted utterance {}", id);
        if self.auto_start {
            self.emit(EngineEvent::Started(id));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        let cancelled = {
            let mut state = lock(&self.state);
            state.cancels += 1;
            state.paused = false;
            state.current.take()
        };
        if let Some(utterance) = cancelled {
            self.emit(EngineEvent::Failed {
                id: utterance.id,
                message: "interrupted".to_string(),
            });
        }
    }

    fn pause_active(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.current.is_some() {
            state.paused = true;
        }
        Ok(())
    }

    fn resume_active(&mut self) -> Result<()> {
        lock(&self.state).paused = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        lock(&self.state).current.is_some()
    }

    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn list_voices(&self) -> Vec<Voice> {
        lock(&self.state).voices.clone()
    }

    fn poll(&mut self) {
        if self.auto_finish && !self.is_paused() {
            self.finish();
        }
    }
}

fn lock(state: &Mutex<SimulatedState>) -> MutexGuard<'_, SimulatedState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

use std::io::{ErrorKind, Write};
use std::process::{Child, Command, Stdio};

use nv_core::{Error, Result};
use tracing::{debug, warn};

use crate::{EngineEvent, EngineEvents, SpeechEngine, Utterance, UtteranceId, Voice};

pub const DEFAULT_PROGRAM: &str = "espeak-ng";

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;

struct Running {
    id: UtteranceId,
    child: Child,
}

/// Speaks through an espeak-compatible synthesizer process.
///
/// One process per utterance. Pausing stops the process with `SIGSTOP`.
pub struct CommandEngine {
    program: String,
    running: Option<Running>,
    paused: bool,
    events: Option<EngineEvents>,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            running: None,
            paused: false,
            events: None,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    fn signal(&self, signal: &str) -> Result<()> {
        let running = self
            .running
            .as_ref()
            .ok_or_else(|| Error::Speech("nothing is playing".to_string()))?;
        let status = Command::new("kill")
            .arg(format!("-{}", signal))
            .arg(running.child.id().to_string())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Speech(format!("kill -{} exited with {}", signal, status)))
        }
    }
}

/// Arguments passed to the synthesizer for `utterance`.
pub fn command_args(utterance: &Utterance) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;
    let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;

    let mut args = vec![
        "-s".to_string(),
        words_per_minute.to_string(),
        "-p".to_string(),
        pitch.to_string(),
    ];
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.name.clone());
    }
    args.push("--stdin".to_string());
    args
}

/// Parses the table printed by `espeak-ng --voices`.
pub fn parse_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_priority, language, _gender, name, ..] => {
                    Some(Voice::new(*name, *language, true))
                }
                _ => None,
            }
        })
        .collect()
}

impl SpeechEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn attach(&mut self, events: EngineEvents) {
        self.events = Some(events);
    }

    fn submit(&mut self, utterance: Utterance) -> Result<()> {
        if self.running.is_some() {
            self.cancel();
        }

        let mut child = Command::new(&self.program)
            .args(command_args(&utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(utterance.text.as_bytes()) {
                Ok(()) => {}
                // The synthesizer may exit before reading everything.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", self.program)
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e.into());
                }
            }
        }

        debug!("Spawned {} (pid {}) for utterance {}", self.program, child.id(), utterance.id);
        self.running = Some(Running {
            id: utterance.id,
            child,
        });
        self.paused = false;
        self.emit(EngineEvent::Started(utterance.id));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut running) = self.running.take() {
            if let Err(e) = running.child.kill() {
                debug!("Synthesizer already gone: {}", e);
            }
            let _ = running.child.wait();
        }
        self.paused = false;
    }

    fn pause_active(&mut self) -> Result<()> {
        self.signal("STOP")?;
        self.paused = true;
        Ok(())
    }

    fn resume_active(&mut self) -> Result<()> {
        self.signal("CONT")?;
        self.paused = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.running.is_some()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn list_voices(&self) -> Vec<Voice> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => {
                parse_voices(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!("{} --voices exited with {}", self.program, output.status);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to list voices with {}: {}", self.program, e);
                Vec::new()
            }
        }
    }

    fn poll(&mut self) {
        let outcome = match self.running.as_mut() {
            Some(running) => match running.child.try_wait() {
                Ok(None) => return,
                Ok(Some(status)) if status.success() => EngineEvent::Ended(running.id),
                Ok(Some(status)) => EngineEvent::Failed {
                    id: running.id,
                    message: format!("{} exited with {}", self.program, status),
                },
                Err(e) => EngineEvent::Failed {
                    id: running.id,
                    message: e.to_string(),
                },
            },
            None => return,
        };
        self.running = None;
        self.paused = false;
        self.emit(outcome);
    }
}

impl Drop for CommandEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

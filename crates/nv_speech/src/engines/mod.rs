pub mod command;
pub mod simulated;

pub use command::CommandEngine;
pub use simulated::{SimulatedEngine, SimulatedMonitor};

use crate::SpeechEngine;
use nv_core::{Error, Result};

/// Builds an engine by name: `command` (espeak-ng) or `simulated`.
pub fn create_engine(kind: &str) -> Result<Box<dyn SpeechEngine>> {
    match kind {
        "command" | "espeak" | "espeak-ng" => Ok(Box::new(CommandEngine::default())),
        "simulated" => Ok(Box::new(SimulatedEngine::new(Vec::new())
            .with_auto_start()
            .with_auto_finish())),
        other => Err(Error::Config(format!(
            "Unknown speech engine: {}. Available engines: command, simulated",
            other
        ))),
    }
}

//! Word pronunciation through an external text-to-speech command.

use crate::config::AudioConfig;
use std::process::{Command, Stdio};

/// Fire-and-forget pronunciation. Failures never reach the caller.
pub trait Speaker {
    fn speak(&self, word: &str);
}

/// Runs the configured TTS program with the word as last argument.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(word)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            // Reap in the background so finished players don't linger as zombies
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => tracing::debug!(program = %self.program, error = %e, "speech command failed"),
        }
    }
}

/// Speaker used when audio is disabled.
pub struct Silent;

impl Speaker for Silent {
    fn speak(&self, _word: &str) {}
}

/// Build the speaker described by the audio config.
pub fn from_config(config: &AudioConfig) -> Box<dyn Speaker> {
    if config.enabled && !config.command.trim().is_empty() {
        Box::new(CommandSpeaker::new(config.command.clone(), config.args.clone()))
    } else {
        Box::new(Silent)
    }
}

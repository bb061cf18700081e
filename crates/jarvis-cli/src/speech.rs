//! Spoken replies through an external text-to-speech program

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Something that can read a reply aloud
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> anyhow::Result<()>;
}

/// Words per minute at rate 1.0
const BASE_WPM: f32 = 175.0;
/// Pitch (0-99) at pitch 1.0
const BASE_PITCH: f32 = 50.0;

/// Speaks through an espeak-compatible command (`-s <wpm> -p <pitch>`)
pub struct CommandSpeaker {
    program: String,
    rate: f32,
    pitch: f32,
}

impl CommandSpeaker {
    /// `rate` and `pitch` are multipliers, clamped to 0.5 - 2.0
    pub fn new(program: impl Into<String>, rate: f32, pitch: f32) -> Self {
        Self {
            program: program.into(),
            rate: rate.clamp(0.5, 2.0),
            pitch: pitch.clamp(0.5, 2.0),
        }
    }

    fn args(&self, text: &str) -> Vec<String> {
        let wpm = (BASE_WPM * self.rate).round() as u32;
        let pitch = (BASE_PITCH * self.pitch).round().min(99.0) as u32;
        vec![
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            speakable(text),
        ]
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        let status = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        anyhow::ensure!(status.success(), "{} exited with {}", self.program, status);
        Ok(())
    }
}

/// Strip markdown punctuation that would otherwise be read out
fn speakable(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`' | '~'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

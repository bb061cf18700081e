//! /voice command - toggle spoken replies

use super::CommandResult;

pub struct VoiceCommand;

impl VoiceCommand {
    pub fn execute(args: &str, enabled: bool) -> CommandResult {
        match args.to_lowercase().as_str() {
            "" => CommandResult::Message(format!(
                "Voice output is {}\nToggle with: /voice on|off",
                if enabled { "on" } else { "off" }
            )),
            "on" | "true" | "1" => CommandResult::SetVoice(true),
            "off" | "false" | "0" => CommandResult::SetVoice(false),
            other => CommandResult::Message(format!(
                "Unknown voice setting: '{}'\nUse /voice on or /voice off",
                other
            )),
        }
    }
}

//! Slash commands for interactive mode

mod style;
mod voice;

pub use style::StyleCommand;
pub use voice::VoiceCommand;

use jarvis_ai::ImageStyle;
use std::path::PathBuf;

/// Result of executing a slash command
pub enum CommandResult {
    /// Clear the conversation and its stored copy
    Clear,
    /// Start a new stored conversation
    NewConversation,
    /// Change the image style
    SetStyle(ImageStyle),
    /// Turn spoken replies on or off
    SetVoice(bool),
    /// Attach an image file to the next message
    Attach(PathBuf),
    /// Print the transcript
    History,
    /// Show a message to the user (not sent to JARVIS)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(
    input: &str,
    current_style: ImageStyle,
    voice_enabled: bool,
) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "new" | "n" => CommandResult::NewConversation,

        "style" | "s" => StyleCommand::execute(args, current_style),

        "voice" | "v" => VoiceCommand::execute(args, voice_enabled),

        "attach" | "a" => {
            if args.is_empty() {
                CommandResult::Message("Usage: /attach <path-to-image>".to_string())
            } else {
                CommandResult::Attach(crate::config::expand_home(args))
            }
        }

        "history" => CommandResult::History,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /clear, /c             Clear the conversation
  /new, /n               Start a new conversation
  /style, /s [id]        List image styles or set one
  /voice, /v [on|off]    Show or toggle spoken replies
  /attach, /a <path>     Attach an image to your next message
  /history               Show the conversation so far
  /quit, /exit, /q       Exit jarvis

Examples:
  /style anime           Generate images in anime style
  /attach ~/photo.jpg    Then ask "what is in this picture?"
  open youtube           Opens YouTube in your browser
  draw a red fox         Generates an image"#
        .to_string()
}

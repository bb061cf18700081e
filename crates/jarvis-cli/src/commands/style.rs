//! /style command - list and set the image style

use super::CommandResult;
use jarvis_ai::ImageStyle;

pub struct StyleCommand;

impl StyleCommand {
    pub fn execute(args: &str, current: ImageStyle) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message(list_styles(current));
        }

        match args.parse::<ImageStyle>() {
            Ok(style) => CommandResult::SetStyle(style),
            Err(_) => CommandResult::Message(format!(
                "Unknown style: '{}'\nUse /style to list available styles",
                args
            )),
        }
    }
}

fn list_styles(current: ImageStyle) -> String {
    let mut output = String::from("Image styles:\n\n");

    for style in ImageStyle::ALL {
        let marker = if style == current { " *" } else { "" };
        output.push_str(&format!("  {:<16} {}{}\n", style.id(), style.name(), marker));
    }

    output.push_str("\nSet with: /style <id>");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_with_current_marked() {
        let CommandResult::Message(text) = StyleCommand::execute("", ImageStyle::Anime) else {
            panic!("expected a message");
        };
        assert!(text.contains("anime            Anime *"));
        assert!(text.contains("3d-render"));
        assert!(!text.contains("Photo Real *"));
    }

    #[test]
    fn test_sets_style() {
        assert!(matches!(
            StyleCommand::execute("oil painting", ImageStyle::default()),
            CommandResult::SetStyle(ImageStyle::OilPainting)
        ));
    }

    #[test]
    fn test_unknown_style() {
        assert!(matches!(
            StyleCommand::execute("baroque", ImageStyle::default()),
            CommandResult::Message(m) if m.contains("baroque")
        ));
    }
}

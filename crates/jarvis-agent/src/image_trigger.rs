//! Detects requests to generate an image and extracts the prompt.

use regex::Regex;
use std::sync::LazyLock;

/// Templates in match order. The first one that captures a non-empty
/// prompt wins.
const IMAGE_PATTERNS: &[&str] = &[
    r"(?i)\bgenerate\s+(?:me\s+)?(?:an?\s+)?(?:image|picture|photo|pic)\s+of\s+(.+)",
    r"(?i)\bcreate\s+(?:me\s+)?(?:an?\s+)?(?:image|picture|photo|pic)\s+of\s+(.+)",
    r"(?i)\bmake\s+(?:me\s+)?(?:an?\s+)?(?:image|picture|photo|pic)\s+of\s+(.+)",
    r"(?i)\bdraw\s+(?:me\s+)?(.+)",
    r"(?i)\b(?:picture|image|photo)\s+of\s+(.+)",
    r"(?i)\bimagine\s+(.+)",
    r"(?i)\bvisualize\s+(.+)",
    r"(?i)^(.+?)\s+(?:ki|ka)\s+(?:image|photo|tasveer)\s+banao\b",
];

static IMAGE_TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    IMAGE_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Extract an image prompt from `text`, if it asks for one.
///
/// The prompt keeps the user's casing and is trimmed of surrounding
/// whitespace.
pub fn detect_prompt(text: &str) -> Option<String> {
    IMAGE_TEMPLATES.iter().find_map(|re| {
        let prompt = re.captures(text)?.get(1)?.as_str().trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(IMAGE_TEMPLATES.len(), IMAGE_PATTERNS.len());
    }

    #[test]
    fn test_generate_image_of() {
        assert_eq!(
            detect_prompt("generate an image of a red fox in the snow").as_deref(),
            Some("a red fox in the snow")
        );
        assert_eq!(
            detect_prompt("Create a picture of Iron Man flying over Delhi").as_deref(),
            Some("Iron Man flying over Delhi")
        );
        assert_eq!(
            detect_prompt("make me a photo of a sunset  ").as_deref(),
            Some("a sunset")
        );
    }

    #[test]
    fn test_other_verbs() {
        assert_eq!(detect_prompt("draw me a dragon").as_deref(), Some("a dragon"));
        assert_eq!(detect_prompt("imagine a city on Mars").as_deref(), Some("a city on Mars"));
        assert_eq!(
            detect_prompt("visualize the solar system").as_deref(),
            Some("the solar system")
        );
        assert_eq!(
            detect_prompt("can I see a picture of a cat wearing a hat").as_deref(),
            Some("a cat wearing a hat")
        );
    }

    #[test]
    fn test_localized_form() {
        assert_eq!(
            detect_prompt("taj mahal ki tasveer banao").as_deref(),
            Some("taj mahal")
        );
    }

    #[test]
    fn test_no_trigger() {
        for text in [
            "",
            "open youtube",
            "what is an image sensor",
            "withdraw money",
            "draw ",
            "generate a report",
        ] {
            assert_eq!(detect_prompt(text), None, "{:?}", text);
        }
    }
}

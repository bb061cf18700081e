//! Rule-based intent classification of user utterances.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. a literal `http(s)://` URL anywhere in the text
//! 2. voice command templates ([`VoiceCommand::ORDER`])
//! 3. "open X" templates, resolved against the known app table
//! 4. generic search templates
//!
//! Anything else classifies as [`ActionKind::None`]. Voice commands match
//! against the original text so captures keep their casing; tiers 3 and 4
//! run on the lowercased text.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What an utterance asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    OpenUrl,
    OpenApp,
    Search,
    #[default]
    None,
}

/// Structured result of classifying one utterance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl ActionDescriptor {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn open_url(target: Option<&str>, url: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::OpenUrl,
            target: target.map(str::to_string),
            url: Some(url.into()),
            search_query: None,
        }
    }

    pub fn open_app(target: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::OpenApp,
            target: Some(target.into()),
            ..Default::default()
        }
    }

    /// A web search for `query`
    pub fn search(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            kind: ActionKind::Search,
            target: None,
            url: Some(google_search_url(&query)),
            search_query: Some(query),
        }
    }

    fn with_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn is_none(&self) -> bool {
        self.kind == ActionKind::None
    }
}

/// Which rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    LiteralUrl,
    Voice(VoiceCommand),
    Open(&'static str),
    Search(&'static str),
    Fallback,
}

/// Classify an utterance. Total: every input yields exactly one descriptor.
pub fn classify(text: &str) -> ActionDescriptor {
    explain(text).1
}

/// Classify an utterance and report which rule matched.
pub fn explain(text: &str) -> (Rule, ActionDescriptor) {
    if let Some(url) = LITERAL_URL.as_ref().and_then(|re| re.find(text)) {
        return (Rule::LiteralUrl, ActionDescriptor::open_url(None, url.as_str()));
    }

    if let Some((command, action)) = VoiceCommand::ORDER
        .iter()
        .find_map(|command| command.try_match(text).map(|a| (*command, a)))
    {
        return (Rule::Voice(command), action);
    }

    let lower = text.to_lowercase();

    if let Some((name, target)) = first_capture(&OPEN_TEMPLATES, &lower) {
        return (Rule::Open(name), resolve_open_target(&target));
    }

    if let Some((name, query)) = first_capture(&SEARCH_TEMPLATES, &lower) {
        return (Rule::Search(name), ActionDescriptor::search(query));
    }

    (Rule::Fallback, ActionDescriptor::none())
}

static LITERAL_URL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"https?://\S+").ok());

/// Voice command templates, tried in [`VoiceCommand::ORDER`].
///
/// Templates naming an explicit app come before looser ones sharing a verb:
/// "play X on spotify" and "search X on youtube" must win over "play music"
/// and the plain Google search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceCommand {
    PlayOnSpotify,
    YoutubeSearch,
    PlayMusic,
    WatchYoutube,
    SearchGoogle,
    NavigateTo,
    OrderFood,
    BookCab,
    SendEmail,
    SetReminder,
    Weather,
}

impl VoiceCommand {
    pub const ORDER: [VoiceCommand; 11] = [
        VoiceCommand::PlayOnSpotify,
        VoiceCommand::YoutubeSearch,
        VoiceCommand::PlayMusic,
        VoiceCommand::WatchYoutube,
        VoiceCommand::SearchGoogle,
        VoiceCommand::NavigateTo,
        VoiceCommand::OrderFood,
        VoiceCommand::BookCab,
        VoiceCommand::SendEmail,
        VoiceCommand::SetReminder,
        VoiceCommand::Weather,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VoiceCommand::PlayOnSpotify => "play_on_spotify",
            VoiceCommand::YoutubeSearch => "youtube_search",
            VoiceCommand::PlayMusic => "play_music",
            VoiceCommand::WatchYoutube => "watch_youtube",
            VoiceCommand::SearchGoogle => "search_google",
            VoiceCommand::NavigateTo => "navigate_to",
            VoiceCommand::OrderFood => "order_food",
            VoiceCommand::BookCab => "book_cab",
            VoiceCommand::SendEmail => "send_email",
            VoiceCommand::SetReminder => "set_reminder",
            VoiceCommand::Weather => "weather",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            VoiceCommand::PlayOnSpotify => {
                r"(?i)\b(?:play|baja|bajao|chalao)\s+(.+?)\s+(?:on\s+)?spotify\b"
            }
            VoiceCommand::YoutubeSearch => {
                r"(?i)\b(?:search|play|dekho|dikhao)\s+(.+?)\s+(?:on\s+)?youtube\b"
            }
            VoiceCommand::PlayMusic => {
                r"(?i)\b(?:play|baja|bajao|chalao)\s+(?:some\s+)?(?:music|songs?|gana|gaana)\b"
            }
            VoiceCommand::WatchYoutube => r"(?i)\b(?:watch|dekho)\s+(.+?)(?:\s+videos?)?\s*$",
            VoiceCommand::SearchGoogle => {
                r"(?i)^\s*(?:search|google|find)\s+(?:on\s+google\s+)?(?:for\s+)?(.+?)(?:\s+on\s+google)?\s*$"
            }
            VoiceCommand::NavigateTo => r"(?i)\b(?:navigate|directions|route)\s+(?:to\s+)?(.+)",
            VoiceCommand::OrderFood => r"(?i)\b(?:order|get)\s+(?:food|khana)(?:\s+(?:from\s+)?(.+))?",
            VoiceCommand::BookCab => r"(?i)\b(?:book|get)\s+(?:a\s+)?(?:cab|taxi|ride)\b",
            VoiceCommand::SendEmail => {
                r"(?i)\b(?:send|compose|write)\s+(?:an?\s+)?(?:email|mail)(?:\s+(?:to\s+)?(.+))?"
            }
            VoiceCommand::SetReminder => {
                r"(?i)\b(?:set|create)\s+(?:a\s+)?(?:reminder|alarm)\s+(?:for\s+)?(.+)"
            }
            VoiceCommand::Weather => r"(?i)\b(?:weather|mausam)(?:\s+(?:in\s+)?(.+))?",
        }
    }

    fn regex(&self) -> Option<&'static Regex> {
        VOICE_COMMANDS
            .iter()
            .find(|(command, _)| command == self)
            .map(|(_, re)| re)
    }

    /// Match this template alone, independent of its position in the order.
    pub fn try_match(&self, text: &str) -> Option<ActionDescriptor> {
        let caps = self.regex()?.captures(text)?;
        self.build(&caps)
    }

    fn build(&self, caps: &Captures) -> Option<ActionDescriptor> {
        let arg = capture(caps, 1);
        let action = match self {
            VoiceCommand::PlayOnSpotify => {
                let q = arg?;
                ActionDescriptor::open_url(
                    Some("spotify"),
                    format!("https://open.spotify.com/search/{}", encode(&q)),
                )
                .with_query(q)
            }
            VoiceCommand::YoutubeSearch | VoiceCommand::WatchYoutube => {
                let q = arg?;
                ActionDescriptor::open_url(Some("youtube"), youtube_search_url(&q)).with_query(q)
            }
            VoiceCommand::PlayMusic => {
                ActionDescriptor::open_url(Some("spotify"), "https://open.spotify.com")
            }
            VoiceCommand::SearchGoogle => ActionDescriptor::search(arg?),
            VoiceCommand::NavigateTo => {
                let place = arg?;
                ActionDescriptor::open_url(
                    Some("maps"),
                    format!(
                        "https://www.google.com/maps/dir/?api=1&destination={}",
                        encode(&place)
                    ),
                )
                .with_query(place)
            }
            VoiceCommand::OrderFood => match arg {
                Some(place) => ActionDescriptor::open_url(
                    Some("zomato"),
                    format!("https://www.zomato.com/search?q={}", encode(&place)),
                ),
                None => ActionDescriptor::open_url(Some("zomato"), "https://www.zomato.com"),
            },
            VoiceCommand::BookCab => {
                ActionDescriptor::open_url(Some("uber"), "https://www.uber.com")
            }
            VoiceCommand::SendEmail => match arg {
                Some(to) => ActionDescriptor::open_url(
                    Some("gmail"),
                    format!("https://mail.google.com/mail/?view=cm&to={}", encode(&to)),
                ),
                None => {
                    ActionDescriptor::open_url(Some("gmail"), "https://mail.google.com/mail/?view=cm")
                }
            },
            VoiceCommand::SetReminder => {
                let what = arg?;
                ActionDescriptor::open_url(
                    Some("calendar"),
                    format!(
                        "https://calendar.google.com/calendar/u/0/r/eventedit?text={}",
                        encode(&what)
                    ),
                )
            }
            VoiceCommand::Weather => match arg {
                Some(place) => ActionDescriptor::search(format!("weather {}", place)),
                None => ActionDescriptor::search("weather"),
            },
        };
        Some(action)
    }
}

static VOICE_COMMANDS: LazyLock<Vec<(VoiceCommand, Regex)>> = LazyLock::new(|| {
    VoiceCommand::ORDER
        .iter()
        .filter_map(|command| match Regex::new(command.pattern()) {
            Ok(re) => Some((*command, re)),
            Err(e) => {
                tracing::warn!("Invalid pattern for voice command '{}': {}", command.name(), e);
                None
            }
        })
        .collect()
});

/// "Open X" templates. "X open karo" precedes "open X" so the Hindi form
/// keeps its target instead of capturing "karo".
const OPEN_PATTERNS: &[(&str, &str)] = &[
    ("x_open_karo", r"(.+)\s+open\s+karo\b"),
    ("open_x", r"\bopen\s+(.+)"),
    ("x_kholo", r"(.+)\s+kholo\b"),
    ("launch_x", r"\blaunch\s+(.+)"),
    ("start_x", r"\bstart\s+(.+)"),
    ("go_to_x", r"\bgo\s+to\s+(.+)"),
    ("show_me_x", r"\bshow\s+me\s+(.+)"),
    ("dikhao_x", r"\bdikhao\s+(.+)"),
];

/// Generic search templates, localized forms before the English verb forms
/// they contain.
const SEARCH_PATTERNS: &[(&str, &str)] = &[
    ("x_search_karo", r"(.+)\s+search\s+karo\b"),
    ("search_for_x", r"\bsearch\s+(?:for\s+)?(.+)"),
    ("find_x", r"\bfind\s+(.+)"),
    ("look_up_x", r"\blook\s+up\s+(.+)"),
    ("x_ke_baare_mein_batao", r"(.+)\s+ke\s+baare\s+mein\s+batao\b"),
];

static OPEN_TEMPLATES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_templates(OPEN_PATTERNS));

static SEARCH_TEMPLATES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_templates(SEARCH_PATTERNS));

fn compile_templates(patterns: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    patterns
        .iter()
        .filter_map(|(name, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((*name, re)),
            Err(e) => {
                tracing::warn!("Invalid pattern for template '{}': {}", name, e);
                None
            }
        })
        .collect()
}

/// First template with a non-empty capture, in list order.
fn first_capture(
    templates: &[(&'static str, Regex)],
    text: &str,
) -> Option<(&'static str, String)> {
    templates.iter().find_map(|(name, re)| {
        let caps = re.captures(text)?;
        capture(&caps, 1).map(|c| (*name, c))
    })
}

fn capture(caps: &Captures, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Known apps and the substrings that identify them, in match order.
pub const APPS: &[(&str, &[&str])] = &[
    ("youtube", &["youtube", "yt"]),
    ("spotify", &["spotify"]),
    ("instagram", &["instagram", "insta"]),
    ("whatsapp", &["whatsapp", "wa"]),
    ("twitter", &["twitter", "x.com"]),
    ("facebook", &["facebook", "fb"]),
    ("linkedin", &["linkedin"]),
    ("google", &["google"]),
    ("gmail", &["gmail", "email", "mail"]),
    ("maps", &["maps", "directions", "navigate"]),
    ("chrome", &["chrome", "browser"]),
    ("camera", &["camera"]),
    ("photos", &["photos", "gallery"]),
    ("settings", &["settings"]),
    ("calculator", &["calculator"]),
    ("calendar", &["calendar"]),
    ("notes", &["notes"]),
    ("music", &["music"]),
    ("netflix", &["netflix"]),
    ("amazon", &["amazon"]),
    ("flipkart", &["flipkart"]),
    ("github", &["github"]),
    ("zomato", &["zomato", "food", "order food"]),
    ("swiggy", &["swiggy"]),
    ("uber", &["uber", "cab", "taxi"]),
    ("ola", &["ola"]),
    ("paytm", &["paytm"]),
    ("phonepe", &["phonepe", "phone pe"]),
    ("gpay", &["gpay", "google pay"]),
    ("telegram", &["telegram"]),
    ("discord", &["discord"]),
    ("reddit", &["reddit"]),
    ("pinterest", &["pinterest"]),
    ("tiktok", &["tiktok"]),
    ("snapchat", &["snapchat"]),
];

/// Web address of a known app; `None` for native-only apps.
pub fn website_url(app: &str) -> Option<&'static str> {
    Some(match app {
        "youtube" => "https://www.youtube.com",
        "spotify" => "https://open.spotify.com",
        "instagram" => "https://www.instagram.com",
        "whatsapp" => "https://web.whatsapp.com",
        "twitter" => "https://twitter.com",
        "facebook" => "https://www.facebook.com",
        "linkedin" => "https://www.linkedin.com",
        "google" => "https://www.google.com",
        "gmail" => "https://mail.google.com",
        "maps" => "https://maps.google.com",
        "github" => "https://github.com",
        "netflix" => "https://www.netflix.com",
        "amazon" => "https://www.amazon.in",
        "flipkart" => "https://www.flipkart.com",
        "zomato" => "https://www.zomato.com",
        "swiggy" => "https://www.swiggy.com",
        "uber" => "https://www.uber.com",
        "ola" => "https://www.olacabs.com",
        "paytm" => "https://paytm.com",
        "phonepe" => "https://www.phonepe.com",
        "gpay" => "https://pay.google.com",
        "telegram" => "https://web.telegram.org",
        "discord" => "https://discord.com",
        "reddit" => "https://www.reddit.com",
        "pinterest" => "https://www.pinterest.com",
        "tiktok" => "https://www.tiktok.com",
        "snapchat" => "https://www.snapchat.com",
        _ => return None,
    })
}

const DOMAIN_MARKERS: &[&str] = &[".com", ".in", ".org", ".net", ".io"];

fn resolve_open_target(target: &str) -> ActionDescriptor {
    if let Some((app, _)) = APPS
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| target.contains(alias)))
    {
        return match website_url(app) {
            Some(url) => ActionDescriptor::open_url(Some(*app), url),
            None => ActionDescriptor::open_app(*app),
        };
    }

    if DOMAIN_MARKERS.iter().any(|m| target.contains(m)) {
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("https://{}", target)
        };
        return ActionDescriptor::open_url(None, url);
    }

    ActionDescriptor::search(target)
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn google_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}", encode(query))
}

fn youtube_search_url(query: &str) -> String {
    format!("https://www.youtube.com/results?search_query={}", encode(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- literal URLs ---

    #[test]
    fn test_literal_url_wins_over_everything() {
        let a = classify("open youtube and go to https://Example.com/Path?q=1 please");
        assert_eq!(a.kind, ActionKind::OpenUrl);
        assert_eq!(a.url.as_deref(), Some("https://Example.com/Path?q=1"));
        assert!(a.target.is_none());

        let (rule, _) = explain("search for http://foo.org/x");
        assert_eq!(rule, Rule::LiteralUrl);
    }

    // --- concrete scenarios ---

    #[test]
    fn test_open_youtube() {
        assert_eq!(
            classify("open youtube"),
            ActionDescriptor {
                kind: ActionKind::OpenUrl,
                target: Some("youtube".into()),
                url: Some("https://www.youtube.com".into()),
                search_query: None,
            }
        );
    }

    #[test]
    fn test_open_yt_alias() {
        for text in ["open yt", "Open YT", "launch yt music", "yt kholo", "yt open karo"] {
            let a = classify(text);
            assert_eq!(a.kind, ActionKind::OpenUrl, "{}", text);
            assert_eq!(a.url.as_deref(), Some("https://www.youtube.com"), "{}", text);
        }
    }

    #[test]
    fn test_search_for_pasta() {
        assert_eq!(
            classify("search for pasta recipes"),
            ActionDescriptor {
                kind: ActionKind::Search,
                target: None,
                url: Some("https://www.google.com/search?q=pasta%20recipes".into()),
                search_query: Some("pasta recipes".into()),
            }
        );
    }

    #[test]
    fn test_no_match_is_none() {
        for text in ["", "   ", "how are you today?", "tell me a joke", "what is 2 + 2"] {
            assert!(classify(text).is_none(), "{:?}", text);
        }
    }

    // --- voice commands, one at a time ---

    #[test]
    fn test_play_on_spotify() {
        let a = VoiceCommand::PlayOnSpotify.try_match("play Shape of You on spotify").unwrap();
        assert_eq!(a.target.as_deref(), Some("spotify"));
        assert_eq!(
            a.url.as_deref(),
            Some("https://open.spotify.com/search/Shape%20of%20You")
        );
        assert_eq!(a.search_query.as_deref(), Some("Shape of You"));
        assert!(VoiceCommand::PlayOnSpotify.try_match("play something").is_none());
    }

    #[test]
    fn test_youtube_search() {
        let a = VoiceCommand::YoutubeSearch
            .try_match("search lo-fi beats on youtube")
            .unwrap();
        assert_eq!(
            a.url.as_deref(),
            Some("https://www.youtube.com/results?search_query=lo-fi%20beats")
        );
        let a = VoiceCommand::YoutubeSearch.try_match("cartoon youtube pe dekho");
        assert!(a.is_none());
        let a = VoiceCommand::YoutubeSearch.try_match("dekho cartoon youtube").unwrap();
        assert_eq!(a.search_query.as_deref(), Some("cartoon"));
    }

    #[test]
    fn test_play_music() {
        let a = VoiceCommand::PlayMusic.try_match("play some music").unwrap();
        assert_eq!(a.url.as_deref(), Some("https://open.spotify.com"));
        assert!(VoiceCommand::PlayMusic.try_match("gaana bajao").is_none());
        assert!(VoiceCommand::PlayMusic.try_match("bajao gaana").is_some());
    }

    #[test]
    fn test_watch_youtube() {
        let a = VoiceCommand::WatchYoutube.try_match("watch cat videos").unwrap();
        assert_eq!(a.search_query.as_deref(), Some("cat"));
        let a = VoiceCommand::WatchYoutube.try_match("watch the news").unwrap();
        assert_eq!(a.search_query.as_deref(), Some("the news"));
        assert!(VoiceCommand::WatchYoutube.try_match("stopwatch please").is_none());
    }

    #[test]
    fn test_search_google() {
        let a = VoiceCommand::SearchGoogle
            .try_match("google best biryani in Hyderabad")
            .unwrap();
        assert_eq!(a.search_query.as_deref(), Some("best biryani in Hyderabad"));
        let a = VoiceCommand::SearchGoogle
            .try_match("search on google for rust traits")
            .unwrap();
        assert_eq!(a.search_query.as_deref(), Some("rust traits"));
        let a = VoiceCommand::SearchGoogle
            .try_match("find rust tutorials on google")
            .unwrap();
        assert_eq!(a.search_query.as_deref(), Some("rust tutorials"));
        assert!(VoiceCommand::SearchGoogle.try_match("please search for x").is_none());
    }

    #[test]
    fn test_navigate_to() {
        let a = VoiceCommand::NavigateTo.try_match("navigate to India Gate").unwrap();
        assert_eq!(a.target.as_deref(), Some("maps"));
        assert_eq!(
            a.url.as_deref(),
            Some("https://www.google.com/maps/dir/?api=1&destination=India%20Gate")
        );
    }

    #[test]
    fn test_order_food() {
        let a = VoiceCommand::OrderFood.try_match("order food from Dominos").unwrap();
        assert_eq!(a.url.as_deref(), Some("https://www.zomato.com/search?q=Dominos"));
        assert!(VoiceCommand::OrderFood.try_match("khana order karo").is_none());
        let a = VoiceCommand::OrderFood.try_match("get khana").unwrap();
        assert_eq!(a.url.as_deref(), Some("https://www.zomato.com"));
    }

    #[test]
    fn test_book_cab() {
        let a = VoiceCommand::BookCab.try_match("book a cab").unwrap();
        assert_eq!(a.url.as_deref(), Some("https://www.uber.com"));
        assert!(VoiceCommand::BookCab.try_match("get a ride home").is_some());
        assert!(VoiceCommand::BookCab.try_match("book a table").is_none());
    }

    #[test]
    fn test_send_email() {
        let a = VoiceCommand::SendEmail
            .try_match("send an email to boss@example.com")
            .unwrap();
        assert_eq!(
            a.url.as_deref(),
            Some("https://mail.google.com/mail/?view=cm&to=boss%40example.com")
        );
        let a = VoiceCommand::SendEmail.try_match("compose mail").unwrap();
        assert_eq!(a.url.as_deref(), Some("https://mail.google.com/mail/?view=cm"));
    }

    #[test]
    fn test_set_reminder() {
        let a = VoiceCommand::SetReminder
            .try_match("set a reminder for dentist at 5pm")
            .unwrap();
        assert_eq!(a.target.as_deref(), Some("calendar"));
        assert_eq!(
            a.url.as_deref(),
            Some("https://calendar.google.com/calendar/u/0/r/eventedit?text=dentist%20at%205pm")
        );
    }

    #[test]
    fn test_weather() {
        let a = VoiceCommand::Weather.try_match("weather in Mumbai").unwrap();
        assert_eq!(a.kind, ActionKind::Search);
        assert_eq!(a.search_query.as_deref(), Some("weather Mumbai"));
        assert_eq!(
            a.url.as_deref(),
            Some("https://www.google.com/search?q=weather%20Mumbai")
        );
        let a = VoiceCommand::Weather.try_match("aaj ka mausam").unwrap();
        assert_eq!(a.search_query.as_deref(), Some("weather"));
    }

    // --- fixed order across the whole classifier ---

    #[test]
    fn test_voice_command_order_is_pinned() {
        let names: Vec<&str> = VoiceCommand::ORDER.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "play_on_spotify",
                "youtube_search",
                "play_music",
                "watch_youtube",
                "search_google",
                "navigate_to",
                "order_food",
                "book_cab",
                "send_email",
                "set_reminder",
                "weather",
            ]
        );
        assert_eq!(VOICE_COMMANDS.len(), VoiceCommand::ORDER.len());
        assert_eq!(OPEN_TEMPLATES.len(), OPEN_PATTERNS.len());
        assert_eq!(SEARCH_TEMPLATES.len(), SEARCH_PATTERNS.len());
    }

    #[test]
    fn test_full_priority_order() {
        let cases: &[(&str, Rule)] = &[
            ("play despacito on spotify", Rule::Voice(VoiceCommand::PlayOnSpotify)),
            ("play music on spotify", Rule::Voice(VoiceCommand::PlayOnSpotify)),
            ("play despacito on youtube", Rule::Voice(VoiceCommand::YoutubeSearch)),
            ("play music on youtube", Rule::Voice(VoiceCommand::YoutubeSearch)),
            ("search cats on youtube", Rule::Voice(VoiceCommand::YoutubeSearch)),
            ("play some music", Rule::Voice(VoiceCommand::PlayMusic)),
            ("watch funny videos", Rule::Voice(VoiceCommand::WatchYoutube)),
            ("search for pasta recipes", Rule::Voice(VoiceCommand::SearchGoogle)),
            ("navigate to the airport", Rule::Voice(VoiceCommand::NavigateTo)),
            ("order food from Haldiram", Rule::Voice(VoiceCommand::OrderFood)),
            ("book a taxi", Rule::Voice(VoiceCommand::BookCab)),
            ("write an email to mom", Rule::Voice(VoiceCommand::SendEmail)),
            ("set reminder for gym", Rule::Voice(VoiceCommand::SetReminder)),
            ("weather in Pune", Rule::Voice(VoiceCommand::Weather)),
            ("open the weather app", Rule::Voice(VoiceCommand::Weather)),
            ("youtube open karo", Rule::Open("x_open_karo")),
            ("open instagram", Rule::Open("open_x")),
            ("whatsapp kholo", Rule::Open("x_kholo")),
            ("launch discord", Rule::Open("launch_x")),
            ("start netflix", Rule::Open("start_x")),
            ("go to reddit", Rule::Open("go_to_x")),
            ("show me my calendar", Rule::Open("show_me_x")),
            ("dikhao photos", Rule::Open("dikhao_x")),
            ("rust lifetimes search karo", Rule::Search("x_search_karo")),
            ("could you search for rust lifetimes", Rule::Search("search_for_x")),
            ("please find a good cafe", Rule::Search("find_x")),
            ("look up the capital of peru", Rule::Search("look_up_x")),
            ("taj mahal ke baare mein batao", Rule::Search("x_ke_baare_mein_batao")),
            ("good morning jarvis", Rule::Fallback),
        ];
        for (text, expected) in cases {
            let (rule, _) = explain(text);
            assert_eq!(rule, *expected, "for {:?}", text);
        }
    }

    // --- open tier resolution ---

    #[test]
    fn test_open_native_app() {
        let a = classify("open calculator");
        assert_eq!(a, ActionDescriptor::open_app("calculator"));
        let a = classify("open camera");
        assert_eq!(a.kind, ActionKind::OpenApp);
    }

    #[test]
    fn test_open_domain() {
        let a = classify("open wikipedia.org");
        assert_eq!(a.kind, ActionKind::OpenUrl);
        assert_eq!(a.url.as_deref(), Some("https://wikipedia.org"));

        let a = classify("go to docs.rs");
        // ".rs" is not a recognized domain marker
        assert_eq!(a.kind, ActionKind::Search);
        assert_eq!(a.search_query.as_deref(), Some("docs.rs"));
    }

    #[test]
    fn test_open_unknown_falls_back_to_search() {
        let a = classify("open the pod bay doors");
        assert_eq!(a.kind, ActionKind::Search);
        assert_eq!(a.search_query.as_deref(), Some("the pod bay doors"));
        assert_eq!(
            a.url.as_deref(),
            Some("https://www.google.com/search?q=the%20pod%20bay%20doors")
        );
    }

    #[test]
    fn test_open_is_case_insensitive_and_trimmed() {
        let a = classify("OPEN   GitHub   ");
        assert_eq!(a.target.as_deref(), Some("github"));
        assert_eq!(a.url.as_deref(), Some("https://github.com"));
    }

    #[test]
    fn test_alias_table_order() {
        // "google pay" mentions google, which is listed before gpay
        let a = classify("open google pay");
        assert_eq!(a.target.as_deref(), Some("google"));
        let a = classify("open phone pe");
        assert_eq!(a.target.as_deref(), Some("phonepe"));
    }

    #[test]
    fn test_earlier_alias_shadows_later_app() {
        // "paytm" contains "yt", and youtube comes first
        let a = classify("open paytm");
        assert_eq!(a.target.as_deref(), Some("youtube"));
        assert_eq!(a.url.as_deref(), Some("https://www.youtube.com"));
    }

    #[test]
    fn test_every_app_with_url_resolves() {
        for (i, (app, aliases)) in APPS.iter().enumerate() {
            let shadowed = APPS[..i]
                .iter()
                .any(|(_, earlier)| earlier.iter().any(|e| aliases[0].contains(e)));
            if shadowed {
                continue;
            }
            let a = resolve_open_target(aliases[0]);
            match website_url(app) {
                Some(url) => assert_eq!(a.url.as_deref(), Some(url), "{}", app),
                None => assert_eq!(a.kind, ActionKind::OpenApp, "{}", app),
            }
        }
    }

    #[test]
    fn test_empty_capture_skips_template() {
        // "open" with nothing after it is not an open command
        assert!(classify("open ").is_none());
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let a = classify("look up c++ & rust?");
        assert_eq!(
            a.url.as_deref(),
            Some("https://www.google.com/search?q=c%2B%2B%20%26%20rust%3F")
        );
    }
}

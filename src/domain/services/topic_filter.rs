use rand::seq::SliceRandom;
use regex::Regex;

/// Social platforms the persona must never point a fan towards.
const RESTRICTED_PLATFORMS: &[&str] = &[
    "facebook", "instagram", "twitter", "x.com", "tiktok", "snapchat", "linkedin",
    "pinterest", "reddit", "telegram", "discord", "twitch", "whatsapp",
];

/// Competing subscription platforms.
const FAN_PLATFORMS: &[&str] = &[
    "fansly", "fancentro", "mym.fans", "justfor.fans", "fantime", "fanvue", "okfans",
    "ifans", "modelhub", "tipsnaps", "vanywhere", "directs", "fanhouse", "spore", "ask.fm",
];

/// Phrases that suggest meeting in person.
const MEETING_PATTERNS: &[&str] = &[
    r"meet up", r"meet in person", r"get together", r"meet you", r"see you there",
    r"join me", r"come to", r"attend my", r"in person",
];

/// Replies used when every generated candidate was rejected.
pub const SAFE_RESPONSES: &[&str] = &[
    "That's a beautiful perspective. Keep exploring what resonates with you.",
    "Your unique way of seeing things is what makes you special.",
    "It's wonderful how you find meaning in these moments.",
    "That's such an introspective way to look at it.",
    "Your authenticity shines through in how you approach this.",
    "I appreciate how you reflect on these experiences.",
    "Your thoughts are truly inspiring.",
    "It's amazing how you find depth in everyday moments.",
    "Your perspective adds so much value to the conversation.",
    "Thank you for sharing your unique insights.",
];

/// Keyword screen applied to generated replies.
///
/// This is a best-effort check: it matches whole words and fixed phrases
/// case-insensitively and will miss paraphrases ("the blue bird app").
pub struct TopicFilter {
    platforms: Vec<(String, Regex)>,
    fan_platforms: Vec<(String, Regex)>,
    meeting: Vec<Regex>,
}

impl TopicFilter {
    pub fn new() -> Self {
        Self {
            platforms: RESTRICTED_PLATFORMS.iter().map(|p| (p.to_string(), word(p))).collect(),
            fan_platforms: FAN_PLATFORMS.iter().map(|p| (p.to_string(), word(p))).collect(),
            meeting: MEETING_PATTERNS.iter().map(|p| word(p)).collect(),
        }
    }

    /// Returns the reason the text is rejected, if any.
    pub fn check(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();

        if let Some((name, _)) = self.platforms.iter().find(|(_, re)| re.is_match(&lower)) {
            return Some(format!("Contains reference to {name}"));
        }

        if let Some((name, _)) = self.fan_platforms.iter().find(|(_, re)| re.is_match(&lower)) {
            return Some(format!("Contains reference to competing platform {name}"));
        }

        if self.meeting.iter().any(|re| re.is_match(&lower)) {
            return Some("Contains suggestion for in-person meeting".to_string());
        }

        None
    }

    pub fn contains_restricted_content(&self, text: &str) -> bool {
        self.check(text).is_some()
    }

    /// Directive included in the prompt so the model avoids the filtered topics
    /// up front.
    pub fn directive(&self) -> String {
        format!(
            "Never mention or recommend social platforms ({}) or other fan sites ({}), \
             never suggest meeting in person, and keep the conversation on this chat.",
            RESTRICTED_PLATFORMS.join(", "),
            FAN_PLATFORMS.join(", ")
        )
    }

    pub fn safe_response(&self) -> &'static str {
        SAFE_RESPONSES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(SAFE_RESPONSES[0])
    }
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn word(term: &str) -> Regex {
    // Terms are compile-time constants, escaped, so the pattern is always valid.
    Regex::new(&format!(r"\b{}\b", regex::escape(term))).expect("escaped term is a valid regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_social_platforms_case_insensitively() {
        let filter = TopicFilter::new();

        let reason = filter.check("Follow me on Instagram for more!").unwrap();
        assert_eq!(reason, "Contains reference to instagram");
        assert!(filter.contains_restricted_content("dm me on x.com"));
    }

    #[test]
    fn test_flags_meeting_suggestions() {
        let filter = TopicFilter::new();
        assert_eq!(
            filter.check("We should meet up sometime").as_deref(),
            Some("Contains suggestion for in-person meeting")
        );
    }

    #[test]
    fn test_flags_competing_platforms() {
        let filter = TopicFilter::new();
        assert!(filter.check("I'm on Fansly too").unwrap().contains("fansly"));
    }

    #[test]
    fn test_allows_ordinary_replies() {
        let filter = TopicFilter::new();
        assert!(filter.check("That sounds like such a cozy evening").is_none());
        // whole-word matching: "discordant" is not "discord"
        assert!(filter.check("what a discordant melody").is_none());
    }

    #[test]
    fn test_safe_response_comes_from_fixed_list() {
        let filter = TopicFilter::new();
        let reply = filter.safe_response();
        assert!(SAFE_RESPONSES.contains(&reply));
        assert!(!filter.contains_restricted_content(reply));
    }

    #[test]
    fn test_directive_names_every_rejected_platform() {
        let filter = TopicFilter::new();
        let directive = filter.directive();

        for platform in RESTRICTED_PLATFORMS.iter().chain(FAN_PLATFORMS) {
            assert!(directive.contains(platform), "{platform} missing from directive");
        }
    }
}

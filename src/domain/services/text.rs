use std::sync::OnceLock;

use regex::Regex;

/// Returned when a completion contains no usable reply at all.
pub const EMPTY_REPLY: &str = "...";

const RESPONSE_FIELD: &str = "Response:";
const CREATOR_FIELD: &str = "Creator:";
const SKIPPED_FIELDS: &[&str] = &["Reasoning:", "Context:", "Situation:"];

fn field_header() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^[A-Z][^:]*:").expect("static regex"))
}

/// Strips everything except ASCII letters, digits, whitespace and basic
/// punctuation (`. , ! ? '`) from user input.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || ".,!?'".contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Cleans dataset text: unifies line endings, replaces non-breaking and
/// zero-width characters, and trims.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(['\u{00a0}', '\u{202f}'], " ")
        .replace(['\u{200b}', '\u{feff}'], "")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .trim()
        .to_string()
}

/// Pulls the persona's reply out of a raw completion.
///
/// The text of the last `Response:` field wins, up to the next `Field:`
/// header line, wherever it appears (the model may reason and answer on one
/// line, or hallucinate several turns). Without such a field:
///
/// - with `chain_of_thought`, unlabelled text is the model's reasoning, so only
///   an explicit `Creator:` line is accepted, else [`EMPTY_REPLY`];
/// - otherwise the first line that is not a known header is used.
pub fn extract_response(raw: &str, chain_of_thought: bool) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return EMPTY_REPLY.to_string();
    }

    if let Some(pos) = raw.rfind(RESPONSE_FIELD) {
        let after = &raw[pos + RESPONSE_FIELD.len()..];
        let mut lines = Vec::new();
        for (i, line) in after.lines().enumerate() {
            if i > 0 && field_header().is_match(line) {
                break;
            }
            lines.push(line);
        }
        let reply = lines.join("\n").trim().to_string();
        if !reply.is_empty() {
            return reply;
        }
    }

    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
    let reply = if chain_of_thought {
        lines
            .filter_map(|l| l.strip_prefix(CREATOR_FIELD))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
    } else {
        lines
            .find(|l| !SKIPPED_FIELDS.iter().any(|f| l.starts_with(f)))
            .map(strip_prefix_field)
    };

    reply
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

fn strip_prefix_field(line: &str) -> &str {
    for prefix in [RESPONSE_FIELD, CREATOR_FIELD] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return rest.trim();
        }
    }
    line
}

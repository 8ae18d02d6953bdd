use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{render_turns, Speaker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self::at(speaker, text, Local::now())
    }

    pub fn at(speaker: Speaker, text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp,
        }
    }
}

/// Append-only record of one chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[TranscriptEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        render_entries(&self.entries)
    }
}

pub fn render_entries(entries: &[TranscriptEntry]) -> String {
    render_turns(entries.iter().map(|e| (e.speaker, e.text.as_str())))
}

//! Conversation log for a session.

use crate::session::{SessionError, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    DungeonMaster,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the transcript as pretty JSON under `dir`, returning the file path.
    pub async fn export(&self, dir: &Path, session: &SessionId) -> Result<PathBuf, SessionError> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(file_name(Utc::now(), session));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).await?;
        Ok(path)
    }
}

fn file_name(at: DateTime<Utc>, session: &SessionId) -> String {
    format!(
        "adventure_{}_{}.json",
        at.format("%Y%m%d_%H%M%S"),
        session.short()
    )
}

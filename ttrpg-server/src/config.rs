//! Server configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ttrpg_core::{DmConfig, SessionConfig};

/// Server configuration loaded from environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port
    pub server_port: u16,

    /// Claude model override
    pub model: Option<String>,
    /// Token limit per Dungeon Master response
    pub max_tokens: usize,

    /// Where transcripts are written on shutdown
    pub transcript_dir: Option<PathBuf>,
    /// Seed for reproducible dice
    pub dice_seed: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            model: env::var("ANTHROPIC_MODEL").ok().filter(|m| !m.is_empty()),
            max_tokens: env::var("DM_MAX_TOKENS")
                .unwrap_or_else(|_| "4096".to_string())
                .parse()
                .context("DM_MAX_TOKENS must be a positive integer")?,

            transcript_dir: env::var("TRANSCRIPT_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            dice_seed: env::var("DICE_SEED")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .context("DICE_SEED must be an unsigned integer")?,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new();
        if let Some(seed) = self.dice_seed {
            config = config.with_seed(seed);
        }
        if let Some(dir) = &self.transcript_dir {
            config = config.with_transcript_dir(dir);
        }
        config
    }

    pub fn dm_config(&self) -> DmConfig {
        DmConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            ..DmConfig::default()
        }
    }
}

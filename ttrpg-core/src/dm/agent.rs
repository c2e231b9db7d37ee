//! Claude-backed Dungeon Master.
//!
//! Each turn sends the conversation so far plus every tool definition, runs
//! whatever tools the model asks for and feeds the results back until the
//! model answers in plain narrative.

use super::prompts::build_system_prompt;
use super::{run_tool, Narrator};
use crate::session::GameSession;
use crate::tools;
use crate::transcript::Speaker;
use async_trait::async_trait;
use claude::{Claude, ContentBlock, Message, Request, Response, Role};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the DM agent.
#[derive(Debug, Error)]
pub enum DmError {
    #[error("Claude API error: {0}")]
    Api(#[from] claude::Error),
}

/// Configuration for the Dungeon Master.
#[derive(Debug, Clone)]
pub struct DmConfig {
    /// The model to use (the client's default when `None`).
    pub model: Option<String>,

    /// Maximum tokens for responses.
    pub max_tokens: usize,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Tool-use round trips allowed per player message.
    pub max_tool_rounds: usize,

    /// Replaces the built-in instructions and scenario.
    pub custom_system_prompt: Option<String>,
}

impl Default for DmConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: Some(0.8),
            max_tool_rounds: 8,
            custom_system_prompt: None,
        }
    }
}

/// Anything that can answer a Messages API request.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: &Request) -> Result<Response, claude::Error>;
}

#[async_trait]
impl Completion for Claude {
    async fn complete(&self, request: &Request) -> Result<Response, claude::Error> {
        Claude::complete(self, request).await
    }
}

/// The AI Dungeon Master.
pub struct DungeonMaster {
    client: Box<dyn Completion>,
    config: DmConfig,
    history: Vec<Message>,
}

impl DungeonMaster {
    /// Create a new DungeonMaster with an API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, DmError> {
        Ok(Self::with_client(Claude::new(api_key)?))
    }

    /// Create a DungeonMaster from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, DmError> {
        Ok(Self::with_client(Claude::from_env()?))
    }

    /// DungeonMaster talking to any [`Completion`] backend.
    pub fn with_client(client: impl Completion + 'static) -> Self {
        Self {
            client: Box::new(client),
            config: DmConfig::default(),
            history: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: DmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DmConfig {
        &self.config
    }

    /// Conversation sent to the model so far.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Forget the conversation; the session itself is untouched.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn push_player_message(&mut self, input: &str) {
        let text = ContentBlock::Text {
            text: input.to_string(),
        };
        // A turn cut short by the round limit leaves tool results as the
        // last user message; the API wants roles to alternate.
        match self.history.last_mut() {
            Some(last) if last.role == Role::User => last.content.push(text),
            _ => self.history.push(Message::user(input)),
        }
    }

    fn request(&self, system: &str) -> Request {
        let mut request = Request::new(self.history.clone())
            .with_system(system)
            .with_max_tokens(self.config.max_tokens)
            .with_tools(tools::definitions());

        if let Some(model) = &self.config.model {
            request = request.with_model(model);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

#[async_trait]
impl Narrator for DungeonMaster {
    async fn narrate(&mut self, input: &str, session: &mut GameSession) -> Result<String, DmError> {
        session.record(Speaker::Player, input);
        self.push_player_message(input);

        let system = build_system_prompt(session, self.config.custom_system_prompt.as_deref());
        let mut narrative = Vec::new();
        let mut rounds = 0;

        loop {
            let response = self.client.complete(&self.request(&system)).await?;

            let text = response.text();
            if !text.is_empty() {
                narrative.push(text);
            }
            // Every tool use needs a result, whatever the stop reason.
            let tool_uses = response.tool_uses();
            if !tool_uses.is_empty() && !response.wants_tools() {
                warn!(stop_reason = ?response.stop_reason, "Answering tool calls from a cut-off response");
            }
            self.history.push(response.into_message());

            if tool_uses.is_empty() {
                break;
            }

            debug!(count = tool_uses.len(), round = rounds, "Running tool calls");
            let results = tool_uses
                .iter()
                .map(|tool_use| {
                    let result = run_tool(&tool_use.name, &tool_use.input, session);
                    ContentBlock::tool_result(&tool_use.id, result)
                })
                .collect();
            self.history.push(Message::tool_results(results));

            rounds += 1;
            if rounds >= self.config.max_tool_rounds {
                warn!(rounds, "Tool round limit reached, ending turn");
                break;
            }
        }

        let reply = narrative.join("\n");
        session.record(Speaker::DungeonMaster, reply.clone());
        Ok(reply)
    }
}

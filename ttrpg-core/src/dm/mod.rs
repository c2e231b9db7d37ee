//! AI Dungeon Master module.
//!
//! A [`Narrator`] turns one player message into narrative, calling tools
//! against the session along the way. [`DungeonMaster`] is the Claude-backed
//! narrator; `testing::ScriptedNarrator` replays canned turns.

mod agent;
mod prompts;

pub use agent::{Completion, DmConfig, DmError, DungeonMaster};
pub use prompts::build_system_prompt;

use crate::session::GameSession;
use crate::tools;
use crate::transcript::Speaker;
use async_trait::async_trait;
use claude::ToolResult;
use serde_json::Value;

/// Something that can run one turn of the adventure.
#[async_trait]
pub trait Narrator: Send {
    /// Respond to `input`, applying any tool calls to `session`.
    async fn narrate(&mut self, input: &str, session: &mut GameSession) -> Result<String, DmError>;
}

/// Execute a tool call, log it in the transcript and package the outcome
/// for the model.
pub(crate) fn run_tool(name: &str, input: &Value, session: &mut GameSession) -> ToolResult {
    let result = match tools::execute(name, input, session) {
        Ok(Value::String(text)) => ToolResult::success(text),
        Ok(value) => ToolResult::success(value.to_string()),
        Err(e) => ToolResult::error(e.to_string()),
    };
    let outcome = if result.is_error { "failed" } else { "->" };
    session.record(
        Speaker::Tool,
        format!("{name} {input} {outcome} {}", result.content),
    );
    result
}

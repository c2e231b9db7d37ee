use crate::session::GameSession;

/// System prompt for the next turn: base instructions plus where the session stands.
pub fn build_system_prompt(session: &GameSession, custom: Option<&str>) -> String {
    let mut prompt = String::new();

    prompt.push_str(custom.unwrap_or(include_str!("prompts/dm_base.txt")));
    prompt.push_str("\n\n## Current State\n\n");
    prompt.push_str(&session.state.summary());
    prompt.push('\n');

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    #[test]
    fn test_default_prompt_has_scenario() {
        let session = GameSession::default();
        let prompt = build_system_prompt(&session, None);
        assert!(prompt.contains("Eldrin"));
        assert!(prompt.contains("hidden cave"));
        assert!(prompt.contains("## Current State"));
        assert!(prompt.contains("Day 1, turn 1"));
    }

    #[test]
    fn test_custom_prompt_replaces_base() {
        let session = GameSession::new(SessionConfig::new().with_starting_location("Harbor"));
        let prompt = build_system_prompt(&session, Some("Run a heist."));
        assert!(prompt.starts_with("Run a heist."));
        assert!(!prompt.contains("Eldrin"));
        assert!(prompt.contains("Location: Harbor"));
    }
}

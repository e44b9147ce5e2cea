//! Session transcript entities

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Tool name for `Role::Tool` messages; `None` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn tool(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_name: Some(name.into()),
        }
    }
}

/// One tool invocation resolved while generating a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub output: String,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
        }
    }
}

/// A completed generation turn: the final response text plus the tool
/// invocations the backend resolved along the way, in the order they
/// ran.
#[derive(Debug, Clone, Default)]
pub struct ResponseTurn {
    pub text: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

impl ResponseTurn {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_invocations: Vec::new(),
        }
    }

    pub fn with_tool_invocation(
        mut self,
        name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.tool_invocations.push(ToolInvocation::new(name, output));
        self
    }
}

/// Ordered record of prompts, responses, and tool invocations within a
/// session.
///
/// Owned by the live session; callers only ever see snapshots (clones),
/// so a transcript in hand never mutates underneath its reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of completed prompt/response turns (user messages answered
    /// by an assistant message).
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_records_turns_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi"));
        transcript.push(Message::assistant("hello"));
        transcript.push(Message::tool("current_date", "Today's date is ..."));

        assert_eq!(transcript.messages().len(), 3);
        assert_eq!(transcript.turns(), 1);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(
            transcript.messages()[2].tool_name.as_deref(),
            Some("current_date")
        );
    }

    #[test]
    fn response_turn_collects_invocations_in_order() {
        let turn = ResponseTurn::from_text("done")
            .with_tool_invocation("current_date", "Today's date is Friday")
            .with_tool_invocation("echo", "hi");

        assert_eq!(turn.text, "done");
        assert_eq!(turn.tool_invocations.len(), 2);
        assert_eq!(turn.tool_invocations[0].name, "current_date");
        assert_eq!(turn.tool_invocations[1].output, "hi");
    }

    #[test]
    fn empty_transcript_has_zero_turns() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.turns(), 0);
    }
}

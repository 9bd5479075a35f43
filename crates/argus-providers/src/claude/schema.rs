use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claude-Code JSONL record, narrowed to the subset this core cares about: a record
/// is either `user`, `assistant`, or `system`; anything else (file-history-snapshot,
/// summary, progress, ...) is dropped silently, the same as a malformed line.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClaudeRecord {
    User(UserRecord),
    Assistant(AssistantRecord),
    System(SystemRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct UserRecord {
    #[serde(default)]
    pub cwd: Option<String>,
    pub message: UserMessage,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct UserMessage {
    #[serde(deserialize_with = "deserialize_text_or_blocks")]
    pub content: Vec<ClaudeBlock>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct AssistantRecord {
    #[serde(default)]
    pub cwd: Option<String>,
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct AssistantMessage {
    #[serde(default, deserialize_with = "deserialize_text_or_blocks")]
    pub content: Vec<ClaudeBlock>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct SystemRecord {
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "deserialize_system_message")]
    pub message: Option<String>,
}

/// Accept either a bare string, `{"content": "..."}`, or anything else (ignored).
fn deserialize_system_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Text(String),
        Wrapped { content: String },
        Other(Value),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        Some(Shape::Text(s)) => Some(s),
        Some(Shape::Wrapped { content }) => Some(content),
        Some(Shape::Other(_)) | None => None,
    })
}

/// `message.content` is either a bare string (wrapped as a single text block) or an
/// array of typed blocks — both shapes appear in real transcripts.
fn deserialize_text_or_blocks<'de, D>(deserializer: D) -> Result<Vec<ClaudeBlock>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Text(String),
        Blocks(Vec<ClaudeBlock>),
    }

    Ok(match Shape::deserialize(deserializer)? {
        Shape::Text(text) => vec![ClaudeBlock::Text { text }],
        Shape::Blocks(blocks) => blocks,
    })
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ClaudeBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

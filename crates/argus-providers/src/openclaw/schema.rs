use serde::Deserialize;
use serde_json::Value;

/// OpenClaw JSONL entry, narrowed to the subset the normalization table covers.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenClawEntry {
    Session(SessionEntry),
    Message(MessageEntry),
    ModelChange,
    ThinkingLevelChange,
    Custom,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct SessionEntry {
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct MessageEntry {
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_text_or_blocks")]
    pub blocks: Vec<OpenClawBlock>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Role {
    User,
    Assistant,
    ToolResult,
}

/// `blocks` is typically an array, but a bare-string message body appears too.
fn deserialize_text_or_blocks<'de, D>(deserializer: D) -> Result<Vec<OpenClawBlock>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Text(String),
        Blocks(Vec<OpenClawBlock>),
    }

    Ok(match Option::<Shape>::deserialize(deserializer)? {
        Some(Shape::Text(text)) => vec![OpenClawBlock::Text { text }],
        Some(Shape::Blocks(blocks)) => blocks,
        None => Vec::new(),
    })
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenClawBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolCall {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    #[serde(other)]
    Unknown,
}

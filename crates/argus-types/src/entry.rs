use serde_json::Value;

/// One parsed line of a transcript, normalized from either dialect (Claude Code or OpenClaw)
/// into this canonical shape. Unknown entries are dropped during parsing, not modeled here —
/// an `Entry` always carries meaning an extractor can act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    User { text: String },
    Assistant { blocks: Vec<Block> },
    System { text: String },
    /// Authoritative cwd for the session; read from inside the transcript rather than decoded
    /// from a lossily-encoded directory name.
    SessionMeta { cwd: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { text: String },
    Thinking { text: String },
    ToolUse { name: String, input: Value },
}

impl Entry {
    pub fn as_user_text(&self) -> Option<&str> {
        match self {
            Entry::User { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_assistant_blocks(&self) -> Option<&[Block]> {
        match self {
            Entry::Assistant { blocks } => Some(blocks),
            _ => None,
        }
    }

    pub fn as_system_text(&self) -> Option<&str> {
        match self {
            Entry::System { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_session_meta_cwd(&self) -> Option<&str> {
        match self {
            Entry::SessionMeta { cwd } => Some(cwd),
            _ => None,
        }
    }
}

impl Block {
    pub fn as_tool_use(&self) -> Option<(&str, &Value)> {
        match self {
            Block::ToolUse { name, input } => Some((name, input)),
            _ => None,
        }
    }

    pub fn as_thinking(&self) -> Option<&str> {
        match self {
            Block::Thinking { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Block::Text { text } => Some(text),
            _ => None,
        }
    }
}

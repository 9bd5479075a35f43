use argus_types::{Block, Entry};
use serde_json::Value;

const TAIL_WINDOW: usize = 30;

/// Current activity: scan backwards over the last ~30 entries, first hit wins.
pub fn current_activity(entries: &[Entry]) -> Option<String> {
    let tail = tail(entries, TAIL_WINDOW);

    for entry in tail.iter().rev() {
        if let Entry::Assistant { blocks } = entry {
            if let Some(thinking) = blocks.iter().rev().find_map(|b| match b {
                Block::Thinking { text } => Some(text),
                _ => None,
            }) {
                if let Some(line) = thinking.lines().rev().find(|l| !l.trim().is_empty()) {
                    return Some(format!("\u{1F4AD} {}", truncate(line.trim(), 120)));
                }
            }
        }
    }

    if let Some(Entry::Assistant { blocks }) = tail.iter().rev().find(|e| matches!(e, Entry::Assistant { .. })) {
        if let Some(label) = blocks.iter().rev().find_map(tool_use_label) {
            return Some(label);
        }
    }

    for entry in tail.iter().rev() {
        if let Entry::Assistant { blocks } = entry {
            if let Some(text) = blocks.iter().find_map(|b| match b {
                Block::Text { text } => Some(text),
                _ => None,
            }) {
                if let Some(line) = text.lines().find(|l| !l.trim().is_empty()) {
                    return Some(truncate(line.trim(), 100));
                }
            }
        }
    }

    None
}

fn tool_use_label(block: &Block) -> Option<String> {
    let Block::ToolUse { name, input } = block else {
        return None;
    };

    Some(match name.as_str() {
        "TodoWrite" => todo_activity(input)?,
        "Task" => format!("Delegating: {}", str_field(input, "description").unwrap_or_default()),
        "Edit" | "Write" => format!("Editing {}", basename(str_field(input, "file_path").unwrap_or_default())),
        "Read" => format!("Reading {}", basename(str_field(input, "file_path").unwrap_or_default())),
        "Bash" => match str_field(input, "description") {
            Some(desc) => desc,
            None => {
                let command = str_field(input, "command").unwrap_or_default();
                format!("Running: {}", truncate(&command, 40))
            }
        },
        "Grep" => format!("Searching for \"{}\"", str_field(input, "pattern").unwrap_or_default()),
        "Glob" => format!("Finding files: {}", str_field(input, "pattern").unwrap_or_default()),
        "WebSearch" => "Searching the web".to_string(),
        "WebFetch" => "Fetching a web page".to_string(),
        "AskUserQuestion" => truncate(&first_question(input).unwrap_or_default(), 100),
        _ => return None,
    })
}

fn todo_activity(input: &Value) -> Option<String> {
    let todos = input.get("todos")?.as_array()?;
    let in_progress = todos
        .iter()
        .find(|t| t.get("status").and_then(|s| s.as_str()) == Some("in_progress"))?;
    in_progress
        .get("activeForm")
        .and_then(|v| v.as_str())
        .or_else(|| in_progress.get("content").and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn first_question(input: &Value) -> Option<String> {
    input
        .get("questions")
        .and_then(|q| q.as_array())
        .and_then(|arr| arr.first())
        .and_then(|q| q.get("question").and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn str_field(input: &Value, field: &str) -> Option<String> {
    input.get(field).and_then(|v| v.as_str()).map(str::to_string)
}

fn basename(path: String) -> String {
    path.rsplit('/').next().unwrap_or(&path).to_string()
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max).collect();
        format!("{truncated}...")
    }
}

pub(crate) fn tail(entries: &[Entry], window: usize) -> &[Entry] {
    let start = entries.len().saturating_sub(window);
    &entries[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assistant_tool(name: &str, input: Value) -> Entry {
        Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: name.to_string(),
                input,
            }],
        }
    }

    #[test]
    fn thinking_block_wins_over_tool_use() {
        let entries = vec![
            assistant_tool("Read", json!({"file_path": "a.rs"})),
            Entry::Assistant {
                blocks: vec![Block::Thinking {
                    text: "line one\nfiguring out the bug".to_string(),
                }],
            },
        ];
        assert_eq!(
            current_activity(&entries),
            Some("\u{1F4AD} figuring out the bug".to_string())
        );
    }

    #[test]
    fn bash_without_description_falls_back_to_command() {
        let entries = vec![assistant_tool("Bash", json!({"command": "cargo test --workspace"}))];
        assert_eq!(current_activity(&entries), Some("Running: cargo test --workspace".to_string()));
    }

    #[test]
    fn edit_uses_basename() {
        let entries = vec![assistant_tool("Edit", json!({"file_path": "/a/b/c.rs"}))];
        assert_eq!(current_activity(&entries), Some("Editing c.rs".to_string()));
    }

    #[test]
    fn falls_back_to_last_text_block() {
        let entries = vec![Entry::Assistant {
            blocks: vec![Block::Text {
                text: "Let me look into that.".to_string(),
            }],
        }];
        assert_eq!(current_activity(&entries), Some("Let me look into that.".to_string()));
    }
}

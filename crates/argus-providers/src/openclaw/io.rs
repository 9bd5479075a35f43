use crate::error::{Error, Result};
use crate::openclaw::schema::{OpenClawBlock, OpenClawEntry, Role};
use argus_types::{Block, Entry};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse an OpenClaw transcript file into the canonical entry stream.
///
/// Unlike Claude-Code, `cwd` arrives as its own `session` entry (normally the first
/// line), so no synthesis is needed — it maps straight to `SessionMeta`. Lines that
/// fail to parse, or that parse into `model_change`/`thinking_level_change`/`custom`,
/// are skipped.
pub fn parse_openclaw_transcript(path: &Path) -> Result<Vec<Entry>> {
    let file = File::open(path).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(Error::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: OpenClawEntry = match serde_json::from_str(line) {
            Ok(e) => e,
            Err(_) => continue,
        };

        if let Some(entry) = to_entry(entry) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// True iff the first non-empty line of `path` is a `session` entry — the format
/// detection rule. Any parse failure means "not OpenClaw" — the caller falls back
/// to Claude-Code parsing.
pub fn is_openclaw_transcript(path: &Path) -> Result<bool> {
    let file = File::open(path).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.map_err(Error::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };
        return Ok(value.get("type").and_then(|t| t.as_str()) == Some("session"));
    }

    Ok(false)
}

/// Read the cwd carried by the leading `session` entry, for discovery.
pub fn extract_cwd(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.map_err(Error::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(OpenClawEntry::Session(s)) = serde_json::from_str::<OpenClawEntry>(line) {
            return Ok(s.cwd);
        }
        break;
    }

    Ok(None)
}

fn to_entry(entry: OpenClawEntry) -> Option<Entry> {
    match entry {
        OpenClawEntry::Session(s) => s.cwd.map(|cwd| Entry::SessionMeta { cwd }),
        OpenClawEntry::Message(m) => match m.role {
            Role::User => {
                let text = text_of(&m.blocks);
                Some(Entry::User { text })
            }
            Role::Assistant => {
                let blocks = m.blocks.into_iter().filter_map(openclaw_block_to_block).collect();
                Some(Entry::Assistant { blocks })
            }
            Role::ToolResult => {
                let text = text_of(&m.blocks);
                Some(Entry::System { text })
            }
        },
        OpenClawEntry::ModelChange | OpenClawEntry::ThinkingLevelChange | OpenClawEntry::Custom => {
            None
        }
        OpenClawEntry::Unknown => None,
    }
}

fn text_of(blocks: &[OpenClawBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            OpenClawBlock::Text { text } => Some(text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn openclaw_block_to_block(block: OpenClawBlock) -> Option<Block> {
    match block {
        OpenClawBlock::Text { text } => Some(Block::Text { text }),
        OpenClawBlock::Thinking { thinking } => Some(Block::Thinking { text: thinking }),
        OpenClawBlock::ToolCall { name, arguments } => Some(Block::ToolUse {
            name,
            input: arguments,
        }),
        OpenClawBlock::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_lines(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn detects_openclaw_by_leading_session_type() {
        let file = write_lines(&[r#"{"type":"session","cwd":"/a/b"}"#]);
        assert!(is_openclaw_transcript(file.path()).unwrap());
    }

    #[test]
    fn non_session_leading_line_is_not_openclaw() {
        let file = write_lines(&[r#"{"type":"user","message":{"content":"hi"}}"#]);
        assert!(!is_openclaw_transcript(file.path()).unwrap());
    }

    #[test]
    fn session_entry_maps_to_session_meta() {
        let file = write_lines(&[
            r#"{"type":"session","cwd":"/a/b"}"#,
            r#"{"type":"message","role":"user","blocks":"hello"}"#,
        ]);
        let entries = parse_openclaw_transcript(file.path()).unwrap();
        assert!(matches!(&entries[0], Entry::SessionMeta { cwd } if cwd == "/a/b"));
        assert!(matches!(&entries[1], Entry::User { text } if text == "hello"));
    }

    #[test]
    fn tool_result_role_maps_to_system() {
        let file = write_lines(&[
            r#"{"type":"message","role":"toolResult","blocks":[{"type":"text","text":"done"}]}"#,
        ]);
        let entries = parse_openclaw_transcript(file.path()).unwrap();
        assert!(matches!(&entries[0], Entry::System { text } if text == "done"));
    }

    #[test]
    fn tool_call_block_maps_to_tool_use() {
        let file = write_lines(&[
            r#"{"type":"message","role":"assistant","blocks":[{"type":"tool_call","name":"bash","arguments":{"command":"ls"}}]}"#,
        ]);
        let entries = parse_openclaw_transcript(file.path()).unwrap();
        let Entry::Assistant { blocks } = &entries[0] else {
            panic!("expected assistant entry");
        };
        let Block::ToolUse { name, input } = &blocks[0] else {
            panic!("expected tool_use block");
        };
        assert_eq!(name, "bash");
        assert_eq!(input["command"], "ls");
    }

    #[test]
    fn model_change_and_custom_entries_are_skipped() {
        let file = write_lines(&[
            r#"{"type":"model_change"}"#,
            r#"{"type":"thinking_level_change"}"#,
            r#"{"type":"custom"}"#,
            r#"{"type":"message","role":"user","blocks":"hi"}"#,
        ]);
        let entries = parse_openclaw_transcript(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
    }
}

use crate::claude::schema::{ClaudeBlock, ClaudeRecord};
use crate::error::{Error, Result};
use argus_types::{Block, Entry};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse a Claude-Code transcript file into the canonical entry stream.
///
/// `cwd` rides along as a top-level field on every record rather than arriving as
/// its own record type, so a `SessionMeta` entry is synthesized the first time a
/// record carrying a cwd is seen, ahead of that record's own entry. Lines that fail
/// to parse as JSON, or parse into a record type this core doesn't model (anything
/// other than `user`/`assistant`/`system`), are skipped — a malformed line is data,
/// not an error.
pub fn parse_claude_transcript(path: &Path) -> Result<Vec<Entry>> {
    let file = File::open(path).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    let mut cwd_seen = false;

    for line in reader.lines() {
        let line = line.map_err(Error::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: ClaudeRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(_) => continue,
        };

        let cwd = record_cwd(&record);
        if !cwd_seen {
            if let Some(cwd) = cwd {
                entries.push(Entry::SessionMeta {
                    cwd: cwd.to_string(),
                });
                cwd_seen = true;
            }
        }

        if let Some(entry) = to_entry(record) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Read just enough of the transcript to learn the project root, without
/// materializing the full entry stream — used by discovery.
pub fn extract_cwd(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(Error::Io)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.map_err(Error::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ClaudeRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(_) => continue,
        };
        if let Some(cwd) = record_cwd(&record) {
            return Ok(Some(cwd.to_string()));
        }
    }

    Ok(None)
}

fn record_cwd(record: &ClaudeRecord) -> Option<&str> {
    match record {
        ClaudeRecord::User(r) => r.cwd.as_deref(),
        ClaudeRecord::Assistant(r) => r.cwd.as_deref(),
        ClaudeRecord::System(r) => r.cwd.as_deref(),
        ClaudeRecord::Unknown => None,
    }
}

fn to_entry(record: ClaudeRecord) -> Option<Entry> {
    match record {
        ClaudeRecord::User(r) => {
            let text = r
                .message
                .content
                .into_iter()
                .filter_map(|b| match b {
                    ClaudeBlock::Text { text } => Some(text),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            Some(Entry::User { text })
        }
        ClaudeRecord::Assistant(r) => {
            let blocks = r
                .message
                .content
                .into_iter()
                .filter_map(claude_block_to_block)
                .collect();
            Some(Entry::Assistant { blocks })
        }
        ClaudeRecord::System(r) => r.message.map(|text| Entry::System { text }),
        ClaudeRecord::Unknown => None,
    }
}

fn claude_block_to_block(block: ClaudeBlock) -> Option<Block> {
    match block {
        ClaudeBlock::Text { text } => Some(Block::Text { text }),
        ClaudeBlock::Thinking { thinking } => Some(Block::Thinking { text: thinking }),
        ClaudeBlock::ToolUse { name, input } => Some(Block::ToolUse { name, input }),
        ClaudeBlock::Unknown => None,
    }
}

//! Transcript parsing, semantic extraction, and session discovery for the two
//! supported agent dialects (Claude Code and OpenClaw).

pub mod claude;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod openclaw;

pub use discovery::{scan_claude_root, scan_openclaw_root, now_secs, DiscoveredSession, Flavor};
pub use error::{Error, Result};

use argus_types::Entry;
use std::path::Path;

/// Parse a transcript of either dialect into the canonical entry stream.
///
/// Format detection: a file is OpenClaw iff its first non-empty line parses as
/// JSON with `type == "session"`; otherwise it is Claude-Code.
pub fn parse_transcript(path: &Path) -> Result<Vec<Entry>> {
    if openclaw::is_openclaw_transcript(path)? {
        openclaw::parse_openclaw_transcript(path)
    } else {
        claude::parse_claude_transcript(path)
    }
}

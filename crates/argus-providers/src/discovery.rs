use crate::error::{Error, Result};
use crate::extract::agent_name;
use crate::{claude, openclaw};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Default Claude Code active threshold: 5 minutes.
pub const DEFAULT_CLAUDE_ACTIVE_THRESHOLD_SECS: u64 = 5 * 60;
/// Default OpenClaw active threshold: 30 minutes.
pub const DEFAULT_OPENCLAW_ACTIVE_THRESHOLD_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Claude,
    OpenClaw,
}

/// One active transcript found by a scan pass: `(sessionId, projectPath,
/// flavor, agentLabel?, transcriptPath)`.
#[derive(Debug, Clone)]
pub struct DiscoveredSession {
    pub session_id: String,
    pub project_path: String,
    pub flavor: Flavor,
    pub agent_label: Option<String>,
    pub transcript_path: PathBuf,
}

/// Scan the Claude Code projects root for active transcripts.
///
/// The directory-encoded path segment under `root` is never decoded — it is lossy
/// by construction — so the real project path is read out of the transcript's
/// `SessionMeta` entry instead.
pub fn scan_claude_root(root: &Path, now_secs: u64, threshold_secs: u64) -> Result<Vec<DiscoveredSession>> {
    let mut sessions = Vec::new();

    if !root.exists() {
        return Ok(sessions);
    }

    for entry in WalkDir::new(root).min_depth(1).max_depth(2).into_iter() {
        let entry = entry.map_err(Error::WalkDir)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        if !is_active(path, now_secs, threshold_secs)? {
            continue;
        }

        let session_id = file_stem(path);
        let Some(project_path) = claude::extract_cwd(path)? else {
            continue;
        };

        sessions.push(DiscoveredSession {
            session_id,
            project_path,
            flavor: Flavor::Claude,
            agent_label: None,
            transcript_path: path.to_path_buf(),
        });
    }

    Ok(sessions)
}

/// Scan the OpenClaw agents root for active transcripts.
///
/// Layout: `<root>/<agentId>/sessions/<sessionId>.jsonl`. Files containing
/// `.deleted.` in the name are skipped outright.
pub fn scan_openclaw_root(root: &Path, now_secs: u64, threshold_secs: u64) -> Result<Vec<DiscoveredSession>> {
    let mut sessions = Vec::new();

    if !root.exists() {
        return Ok(sessions);
    }

    for entry in WalkDir::new(root).min_depth(1).max_depth(3).into_iter() {
        let entry = entry.map_err(Error::WalkDir)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if !file_name.ends_with(".jsonl") || file_name.contains(".deleted.") {
            continue;
        }
        if !is_active(path, now_secs, threshold_secs)? {
            continue;
        }

        let session_id = file_stem(path);
        let Some(project_path) = openclaw::extract_cwd(path)? else {
            continue;
        };

        let project_dir = Path::new(&project_path);
        let label = agent_name(project_dir, path);

        sessions.push(DiscoveredSession {
            session_id,
            project_path,
            flavor: Flavor::OpenClaw,
            agent_label: label,
            transcript_path: path.to_path_buf(),
        });
    }

    Ok(sessions)
}

fn is_active(path: &Path, now_secs: u64, threshold_secs: u64) -> Result<bool> {
    let metadata = std::fs::metadata(path).map_err(Error::Io)?;
    let modified = metadata.modified().map_err(Error::Io)?;
    let modified_secs = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Ok(now_secs.saturating_sub(modified_secs) < threshold_secs)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_claude_root_reads_cwd_from_transcript() {
        let root = TempDir::new().unwrap();
        let project_dir = root.path().join("-home-j-tts");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(
            project_dir.join("session1.jsonl"),
            r#"{"type":"user","cwd":"/home/j/tts","message":{"content":"hi"}}"#,
        )
        .unwrap();

        let sessions = scan_claude_root(root.path(), now_secs(), DEFAULT_CLAUDE_ACTIVE_THRESHOLD_SECS).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].project_path, "/home/j/tts");
        assert_eq!(sessions[0].session_id, "session1");
        assert_eq!(sessions[0].flavor, Flavor::Claude);
    }

    #[test]
    fn stale_claude_transcript_is_skipped() {
        let root = TempDir::new().unwrap();
        let project_dir = root.path().join("-home-j-tts");
        fs::create_dir_all(&project_dir).unwrap();
        let file = project_dir.join("session1.jsonl");
        fs::write(&file, r#"{"type":"user","cwd":"/home/j/tts","message":{"content":"hi"}}"#).unwrap();

        let sessions = scan_claude_root(root.path(), now_secs() + 10 * 60, DEFAULT_CLAUDE_ACTIVE_THRESHOLD_SECS).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn deleted_openclaw_files_are_skipped() {
        let root = TempDir::new().unwrap();
        let session_dir = root.path().join("agent1").join("sessions");
        fs::create_dir_all(&session_dir).unwrap();
        fs::write(
            session_dir.join("s1.deleted.jsonl"),
            r#"{"type":"session","cwd":"/a/b"}"#,
        )
        .unwrap();

        let sessions = scan_openclaw_root(root.path(), now_secs(), DEFAULT_OPENCLAW_ACTIVE_THRESHOLD_SECS).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn scan_openclaw_root_reads_cwd_and_agent_label() {
        let root = TempDir::new().unwrap();
        let session_dir = root.path().join("agent1").join("sessions");
        fs::create_dir_all(&session_dir).unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            session_dir.join("s1.jsonl"),
            format!(
                r#"{{"type":"session","cwd":"{}"}}"#,
                project_dir.path().to_string_lossy().replace('\\', "/")
            ),
        )
        .unwrap();

        let sessions = scan_openclaw_root(root.path(), now_secs(), DEFAULT_OPENCLAW_ACTIVE_THRESHOLD_SECS).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].flavor, Flavor::OpenClaw);
        assert_eq!(sessions[0].agent_label, Some("agent1".to_string()));
    }
}

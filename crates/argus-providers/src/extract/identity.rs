use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*Name:\*\*\s*(.+)$").expect("static pattern"));
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").expect("static pattern"));

/// OpenClaw agent name: `**Name:** <text>` in `IDENTITY.md` under the
/// project directory, parenthetical stripped. Falls back to the `<agentId>` path
/// segment of `…/agents/<agentId>/sessions/<sessionId>.jsonl`.
pub fn agent_name(project_dir: &Path, transcript_path: &Path) -> Option<String> {
    identity_md_name(project_dir).or_else(|| agent_id_from_path(transcript_path))
}

fn identity_md_name(project_dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(project_dir.join("IDENTITY.md")).ok()?;
    let name = NAME_LINE.captures(&content)?.get(1)?.as_str();
    Some(PARENTHETICAL.replace_all(name, "").trim().to_string())
}

fn agent_id_from_path(transcript_path: &Path) -> Option<String> {
    let components: Vec<_> = transcript_path.components().collect();
    let agents_idx = components
        .iter()
        .position(|c| c.as_os_str() == "agents")?;
    components
        .get(agents_idx + 1)
        .map(|c| c.as_os_str().to_string_lossy().to_string())
}

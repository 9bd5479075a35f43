use argus_types::ProjectId;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Number of hex characters a project id is truncated to: a stable 12-hex-digit digest.
const PROJECT_ID_LEN: usize = 12;

/// Resolve argus's own config/state directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. ARGUS_HOME environment variable (with tilde expansion)
/// 3. `~/.argus` (the documented default)
pub fn resolve_argus_home(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("ARGUS_HOME") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".argus"));
    }

    Err(Error::Config(
        "could not determine argus home: no HOME directory set".to_string(),
    ))
}

/// Default Claude Code transcript root: `$HOME/.claude/projects`.
pub fn default_claude_root() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| Error::Config("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home).join(".claude").join("projects"))
}

/// Default OpenClaw transcript root: `$HOME/.openclaw/agents`.
pub fn default_openclaw_root() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .ok_or_else(|| Error::Config("HOME is not set".to_string()))?;
    Ok(PathBuf::from(home).join(".openclaw").join("agents"))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Compute the project id from a project root: a 12-hex-digit digest of the
/// *normalized* path (lower-cased, forward-slash, no trailing slash).
///
/// Git worktree support: if the path is inside a git worktree, the git common
/// directory (shared `.git`) is hashed instead of the working-directory path,
/// so every worktree of the same repository resolves to the same project id.
pub fn project_id_from_root(project_root: &str) -> ProjectId {
    let path = Path::new(project_root);

    let hash_target = match detect_git_common_dir(path) {
        Some(common_dir) => common_dir,
        None => normalize_path(path),
    };

    ProjectId::new(hash_path(&hash_target))
}

/// Hash a path the same way as [`project_id_from_root`], for callers (e.g. orphaned
/// sessions with no discoverable project root) that want an id from a raw path.
pub fn project_id_from_path(path: &Path) -> ProjectId {
    ProjectId::new(hash_path(path))
}

fn hash_path(path: &Path) -> String {
    let normalized = canonical_string(path);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let full = format!("{:x}", hasher.finalize());
    full[..PROJECT_ID_LEN].to_string()
}

/// Normalize for hashing: lower-cased, forward-slash, no trailing slash.
fn canonical_string(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/").to_lowercase();
    s.trim_end_matches('/').to_string()
}

/// Detect the git common directory for worktree support.
///
/// Returns Some(path) only if the directory is part of a git worktree
/// (i.e., git-dir and git-common-dir are different).
/// Returns None for non-git directories or regular git repositories.
fn detect_git_common_dir(path: &Path) -> Option<PathBuf> {
    use std::process::Command;

    let git_dir = Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(path)
        .output()
        .ok()?;

    let git_common_dir = Command::new("git")
        .args(["rev-parse", "--git-common-dir"])
        .current_dir(path)
        .output()
        .ok()?;

    if !git_dir.status.success() || !git_common_dir.status.success() {
        return None;
    }

    let git_dir_str = String::from_utf8_lossy(&git_dir.stdout);
    let git_common_dir_str = String::from_utf8_lossy(&git_common_dir.stdout);

    let git_dir_path = Path::new(git_dir_str.trim());
    let git_common_dir_path = Path::new(git_common_dir_str.trim());

    let git_dir_normalized = normalize_path(git_dir_path);
    let git_common_dir_normalized = normalize_path(git_common_dir_path);

    if git_dir_normalized != git_common_dir_normalized {
        Some(git_common_dir_normalized)
    } else {
        None
    }
}

/// Normalize a path for comparison (resolve to absolute, canonicalize if possible)
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

/// The display name of a project: the final path segment.
pub fn display_name(project_path: &str) -> String {
    Path::new(project_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| project_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn project_id_is_twelve_hex_chars() {
        let id = project_id_from_root("/tmp/some/project");
        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn project_id_is_case_and_trailing_slash_insensitive() {
        let a = project_id_from_root("/Home/J/TTS/");
        let b = project_id_from_root("/home/j/tts");
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn display_name_is_final_segment() {
        assert_eq!(display_name("/home/j/tts"), "tts");
        assert_eq!(display_name("/home/j/tts/"), "tts");
    }

    #[test]
    fn detect_git_common_dir_non_git() {
        let result = detect_git_common_dir(Path::new("/tmp"));
        assert!(result.is_none());
    }

    #[test]
    fn git_worktree_shares_project_id() {
        use std::fs;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let bare_repo = temp_dir.path().join("repo.git");
        let wt1 = temp_dir.path().join("wt1");
        let wt2 = temp_dir.path().join("wt2");

        let init = Command::new("git")
            .args(["init", "--bare"])
            .arg(&bare_repo)
            .output()
            .unwrap();
        if !init.status.success() {
            return;
        }

        let temp_clone = temp_dir.path().join("temp_clone");
        let clone = Command::new("git")
            .args(["clone"])
            .arg(&bare_repo)
            .arg(&temp_clone)
            .output()
            .unwrap();
        if !clone.status.success() {
            return;
        }

        fs::write(temp_clone.join("README.md"), "# Test").unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(&temp_clone)
            .output()
            .unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(&temp_clone)
            .output()
            .unwrap();
        Command::new("git")
            .args(["push", "origin", "HEAD"])
            .current_dir(&temp_clone)
            .output()
            .ok();

        let branch_output = Command::new("git")
            .args(["branch", "--show-current"])
            .current_dir(&temp_clone)
            .output()
            .unwrap();
        let branch = String::from_utf8_lossy(&branch_output.stdout)
            .trim()
            .to_string();
        if branch.is_empty() {
            return;
        }

        let wt1_result = Command::new("git")
            .args(["worktree", "add"])
            .arg(&wt1)
            .arg(&branch)
            .current_dir(&bare_repo)
            .output()
            .unwrap();
        if !wt1_result.status.success() {
            return;
        }

        let wt2_result = Command::new("git")
            .args(["worktree", "add", "-b", "feature"])
            .arg(&wt2)
            .arg(&branch)
            .current_dir(&bare_repo)
            .output()
            .unwrap();
        if !wt2_result.status.success() {
            return;
        }

        let id1 = project_id_from_root(wt1.to_str().unwrap());
        let id2 = project_id_from_root(wt2.to_str().unwrap());
        assert_eq!(id1.as_str(), id2.as_str());
    }
}

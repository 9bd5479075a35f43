use crate::extract::activity::tail;
use argus_types::{Block, Entry};
use once_cell::sync::Lazy;
use regex::Regex;

const TAIL_WINDOW: usize = 30;

static SERVER_START_COMMANDS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"npm run (dev|start|serve)",
        r"\bvite\b",
        r"\bnext\b",
        r"node .*server",
        r"python -?m? ?(flask|uvicorn|http\.server)",
        r"cargo run",
        r"go run .*server",
        r"docker(-compose)? (up|run)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static server-start pattern is valid"))
    .collect()
});

static SERVER_OUTPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(listening on|server (running|started|listening)|local:\s*https?://localhost|ready in \d+(ms|s))")
        .expect("static pattern")
});

static PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r":(\d{4,5})\b").expect("static pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRunning {
    pub port: Option<u32>,
}

/// Server-running detection: a background `Bash` launch matching a known
/// dev-server command, or system/assistant output announcing it is now listening.
pub fn server_running(entries: &[Entry]) -> Option<ServerRunning> {
    let window = tail(entries, TAIL_WINDOW);

    for entry in window.iter().rev() {
        if let Entry::Assistant { blocks } = entry {
            for block in blocks {
                let Block::ToolUse { name, input } = block else {
                    continue;
                };
                if name != "Bash" {
                    continue;
                }
                let in_background = input.get("run_in_background").and_then(|v| v.as_bool()).unwrap_or(false);
                if !in_background {
                    continue;
                }
                let Some(command) = input.get("command").and_then(|v| v.as_str()) else {
                    continue;
                };
                if SERVER_START_COMMANDS.iter().any(|re| re.is_match(command)) {
                    return Some(ServerRunning {
                        port: extract_port(command),
                    });
                }
            }
        }
    }

    for entry in window.iter().rev() {
        let text = match entry {
            Entry::System { text } => Some(text.as_str()),
            Entry::Assistant { blocks } => blocks.iter().find_map(|b| match b {
                Block::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            _ => None,
        };
        if let Some(text) = text {
            if SERVER_OUTPUT.is_match(text) {
                return Some(ServerRunning {
                    port: extract_port(text),
                });
            }
        }
    }

    None
}

fn extract_port(text: &str) -> Option<u32> {
    PORT.captures(text).and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn background_dev_server_command_is_detected() {
        let entries = vec![Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "Bash".to_string(),
                input: json!({"command": "npm run dev", "run_in_background": true}),
            }],
        }];
        assert_eq!(server_running(&entries), Some(ServerRunning { port: None }));
    }

    #[test]
    fn foreground_command_is_not_detected() {
        let entries = vec![Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "Bash".to_string(),
                input: json!({"command": "npm run dev", "run_in_background": false}),
            }],
        }];
        assert_eq!(server_running(&entries), None);
    }

    #[test]
    fn system_output_extracts_port() {
        let entries = vec![Entry::System {
            text: "Server listening on http://localhost:4242".to_string(),
        }];
        assert_eq!(server_running(&entries), Some(ServerRunning { port: Some(4242) }));
    }
}

use argus_types::{Block, Entry};

/// Plan mode flag: the most recent of `EnterPlanMode`/`ExitPlanMode` wins.
pub fn is_planning(entries: &[Entry]) -> bool {
    for entry in entries.iter().rev() {
        let Entry::Assistant { blocks } = entry else {
            continue;
        };
        for block in blocks.iter().rev() {
            let Block::ToolUse { name, .. } = block else {
                continue;
            };
            match name.as_str() {
                "EnterPlanMode" => return true,
                "ExitPlanMode" => return false,
                _ => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> Entry {
        Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: name.to_string(),
                input: json!({}),
            }],
        }
    }

    #[test]
    fn enter_then_exit_clears_the_flag() {
        assert!(!is_planning(&[tool("EnterPlanMode"), tool("ExitPlanMode")]));
    }

    #[test]
    fn enter_without_exit_sets_the_flag() {
        assert!(is_planning(&[tool("EnterPlanMode")]));
    }

    #[test]
    fn neither_seen_defaults_to_false() {
        assert!(!is_planning(&[Entry::User {
            text: "hi".to_string()
        }]));
    }
}

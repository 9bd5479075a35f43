use crate::extract::activity::truncate;
use argus_types::{Block, Entry};

/// Pending question: only the single nearest `Assistant` entry before the first
/// `User` entry (or the start of the transcript) is eligible — same restriction
/// `current_activity`'s Rule 2 applies. A multi-step OpenClaw tool loop has no
/// intervening `User` entry between assistant turns (tool results land as
/// `Entry::System`), so without this restriction an older question would
/// resurface even though the agent's latest turn made ordinary tool calls.
pub fn pending_question(entries: &[Entry]) -> Option<String> {
    for entry in entries.iter().rev() {
        match entry {
            Entry::User { .. } => return None,
            Entry::Assistant { blocks } => {
                for block in blocks.iter().rev() {
                    let Block::ToolUse { name, input } = block else {
                        continue;
                    };
                    match name.as_str() {
                        "AskUserQuestion" => {
                            return Some(
                                first_question_text(input)
                                    .unwrap_or_else(|| "Waiting for your response...".to_string()),
                            );
                        }
                        "ExitPlanMode" => return Some("Accept this plan?".to_string()),
                        "EnterPlanMode" => return Some("Enter plan mode?".to_string()),
                        _ => {}
                    }
                }
                return None;
            }
            _ => {}
        }
    }
    None
}

fn first_question_text(input: &serde_json::Value) -> Option<String> {
    input
        .get("questions")
        .and_then(|q| q.as_array())
        .and_then(|arr| arr.first())
        .and_then(|q| q.get("question").and_then(|v| v.as_str()))
        .map(|text| truncate(text, 100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ask_user_question_returns_question_text() {
        let entries = vec![Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "AskUserQuestion".to_string(),
                input: json!({"questions": [{"question": "Use npm or yarn?"}]}),
            }],
        }];
        assert_eq!(pending_question(&entries), Some("Use npm or yarn?".to_string()));
    }

    #[test]
    fn user_entry_stops_the_scan() {
        let entries = vec![
            Entry::Assistant {
                blocks: vec![Block::ToolUse {
                    name: "AskUserQuestion".to_string(),
                    input: json!({}),
                }],
            },
            Entry::User {
                text: "yarn please".to_string(),
            },
        ];
        assert_eq!(pending_question(&entries), None);
    }

    #[test]
    fn stale_question_behind_a_later_assistant_turn_is_not_resurfaced() {
        // OpenClaw tool-result entries map to `Entry::System`, not `Entry::User`,
        // so a multi-step tool loop never interrupts the scan with a `User` entry.
        let entries = vec![
            Entry::Assistant {
                blocks: vec![Block::ToolUse {
                    name: "AskUserQuestion".to_string(),
                    input: json!({"questions": [{"question": "Use npm or yarn?"}]}),
                }],
            },
            Entry::System {
                text: "tool result".to_string(),
            },
            Entry::Assistant {
                blocks: vec![Block::ToolUse {
                    name: "Read".to_string(),
                    input: json!({"file_path": "a.rs"}),
                }],
            },
        ];
        assert_eq!(pending_question(&entries), None);
    }

    #[test]
    fn exit_plan_mode_asks_to_accept() {
        let entries = vec![Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "ExitPlanMode".to_string(),
                input: json!({}),
            }],
        }];
        assert_eq!(pending_question(&entries), Some("Accept this plan?".to_string()));
    }
}

use argus_types::{Block, Entry, TodoItem, TodoList, TodoStatus};

/// TODO list: the most recent `TodoWrite` call wins outright, it is a
/// snapshot, not a delta.
pub fn current_todos(entries: &[Entry]) -> Option<TodoList> {
    for entry in entries.iter().rev() {
        let Entry::Assistant { blocks } = entry else {
            continue;
        };
        for block in blocks.iter().rev() {
            let Block::ToolUse { name, input } = block else {
                continue;
            };
            if name != "TodoWrite" {
                continue;
            }
            let todos = input.get("todos")?.as_array()?;
            let items = todos
                .iter()
                .filter_map(|t| {
                    let content = t.get("content")?.as_str()?.to_string();
                    let status = match t.get("status")?.as_str()? {
                        "pending" => TodoStatus::Pending,
                        "in_progress" => TodoStatus::InProgress,
                        "completed" => TodoStatus::Completed,
                        _ => return None,
                    };
                    let active_form = t
                        .get("activeForm")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                    Some(TodoItem {
                        content,
                        status,
                        active_form,
                    })
                })
                .collect();
            return Some(TodoList::from_items(items));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn most_recent_todo_write_wins() {
        let old = Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "TodoWrite".to_string(),
                input: json!({"todos": [{"content": "old", "status": "pending"}]}),
            }],
        };
        let new = Entry::Assistant {
            blocks: vec![Block::ToolUse {
                name: "TodoWrite".to_string(),
                input: json!({"todos": [
                    {"content": "a", "status": "completed"},
                    {"content": "b", "status": "in_progress", "activeForm": "Doing b"}
                ]}),
            }],
        };
        let todos = current_todos(&[old, new]).unwrap();
        assert_eq!(todos.items.len(), 2);
        assert_eq!(todos.counts.completed, 1);
        assert_eq!(todos.counts.in_progress, 1);
    }

    #[test]
    fn no_todo_write_returns_none() {
        let entries = vec![Entry::User {
            text: "hi".to_string(),
        }];
        assert!(current_todos(&entries).is_none());
    }
}

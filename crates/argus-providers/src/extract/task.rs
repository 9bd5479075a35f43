use crate::extract::activity::truncate;
use argus_types::Entry;

/// Initial task: the first `User` entry's text.
pub fn initial_task(entries: &[Entry]) -> Option<String> {
    entries.iter().find_map(|e| match e {
        Entry::User { text } => Some(truncate(text, 100)),
        _ => None,
    })
}

/// Last user message: the most recent `User` entry's text.
pub fn last_user_message(entries: &[Entry]) -> Option<String> {
    entries.iter().rev().find_map(|e| match e {
        Entry::User { text } => Some(truncate(text, 100)),
        _ => None,
    })
}

use argus_types::Entry;
use once_cell::sync::Lazy;
use regex::Regex;

static OVERFLOW_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)prompt is too long",
        r"(?i)context.*(too long|exceeded|overflow)",
        r"(?i)maximum.*tokens?.*(exceeded|reached)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static system-error pattern is valid"))
    .collect()
});

/// System error: only ever looks at `System` entries, never user text,
/// to avoid false positives from the user *discussing* an error.
pub fn system_error(entries: &[Entry]) -> Option<String> {
    entries.iter().rev().find_map(|entry| {
        let Entry::System { text } = entry else {
            return None;
        };
        OVERFLOW_PATTERNS
            .iter()
            .any(|re| re.is_match(text))
            .then(|| text.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_prompt_overflow_in_system_entry() {
        let entries = vec![Entry::System {
            text: "Error: prompt is too long for the model".to_string(),
        }];
        assert!(system_error(&entries).is_some());
    }

    #[test]
    fn user_discussing_the_error_is_not_flagged() {
        let entries = vec![Entry::User {
            text: "I got a 'prompt is too long' error yesterday".to_string(),
        }];
        assert!(system_error(&entries).is_none());
    }
}

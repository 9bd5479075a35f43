use argus_runtime::{EventMetadata, InboxEvent};
use argus_types::AgentType;
use serde::Deserialize;
use std::fmt;

/// Wire shape of the ingress event envelope (POST /events). `sessionId` and
/// `projectPath` are the only required fields; everything else is optional and
/// falls back sensibly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    pub session_id: Option<String>,
    pub project_path: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub metadata: Option<EnvelopeMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    #[serde(default)]
    pub delegating_to: Option<String>,
    #[serde(default)]
    pub background_task_complete: Option<String>,
    #[serde(default)]
    pub ralph_iteration: Option<u32>,
    #[serde(default)]
    pub ralph_max_iterations: Option<u32>,
    #[serde(default)]
    pub ultrawork_active: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<EnvelopeMetadata> for EventMetadata {
    fn from(m: EnvelopeMetadata) -> Self {
        Self {
            delegating_to: m.delegating_to,
            background_task_complete: m.background_task_complete,
            ralph_iteration: m.ralph_iteration,
            ralph_max_iterations: m.ralph_max_iterations,
            ultrawork_active: m.ultrawork_active,
            source: m.source,
        }
    }
}

/// Envelope failed validation: missing `sessionId` or `projectPath` rejects with
/// a non-fatal error response, leaving state unchanged.
#[derive(Debug)]
pub struct EnvelopeError(pub String);

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for EnvelopeError {}

impl EventEnvelope {
    pub fn into_inbox_event(self) -> Result<InboxEvent, EnvelopeError> {
        let session_id = self
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EnvelopeError("missing required field: sessionId".to_string()))?;
        let project_path = self
            .project_path
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EnvelopeError("missing required field: projectPath".to_string()))?;
        let project_name = self
            .project_name
            .unwrap_or_else(|| argus_core::display_name(&project_path));

        if let Some(metadata) = &self.metadata {
            if let Some(shell_id) = &metadata.background_task_complete {
                return Ok(InboxEvent::BackgroundTaskComplete {
                    shell_id: shell_id.clone(),
                });
            }
        }

        match self.event_type.as_str() {
            "session_start" => Ok(InboxEvent::SessionStart {
                session_id,
                project_path,
                project_name,
                task: self.task,
            }),
            "session_end" => Ok(InboxEvent::SessionEnd {
                session_id,
                project_path,
            }),
            "agent_spawn" => {
                let agent_id = self
                    .agent_id
                    .ok_or_else(|| EnvelopeError("agent_spawn requires agentId".to_string()))?;
                let agent_type = match self.agent_type.as_deref() {
                    Some("background") => AgentType::Background,
                    _ => AgentType::Subagent,
                };
                Ok(InboxEvent::AgentSpawn {
                    parent_session_id: session_id,
                    project_path,
                    project_name,
                    agent_id,
                    agent_name: self.agent_name,
                    agent_type,
                    task: self.task,
                    metadata: self.metadata.map(EventMetadata::from),
                })
            }
            "agent_blocked" => Ok(InboxEvent::AgentBlocked {
                session_id,
                project_path,
                question: self
                    .question
                    .unwrap_or_else(|| "Waiting for your response...".to_string()),
            }),
            "agent_unblocked" => Ok(InboxEvent::AgentUnblocked {
                session_id,
                project_path,
            }),
            "agent_complete" => Ok(InboxEvent::AgentComplete {
                session_id,
                project_path,
                agent_id: self.agent_id,
                agent_name: self.agent_name,
                task: self.task,
            }),
            "activity" => Ok(InboxEvent::Activity {
                session_id,
                project_path,
            }),
            other => Err(EnvelopeError(format!("unknown event type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_type: event_type.to_string(),
            session_id: Some("s1".into()),
            project_path: Some("/a/b".into()),
            project_name: None,
            agent_id: None,
            agent_name: None,
            agent_type: None,
            task: None,
            question: None,
            metadata: None,
        }
    }

    #[test]
    fn missing_session_id_is_rejected() {
        let mut env = envelope("activity");
        env.session_id = None;
        assert!(env.into_inbox_event().is_err());
    }

    #[test]
    fn missing_project_path_is_rejected() {
        let mut env = envelope("activity");
        env.project_path = None;
        assert!(env.into_inbox_event().is_err());
    }

    #[test]
    fn project_name_falls_back_to_final_path_segment() {
        let event = envelope("session_start").into_inbox_event().unwrap();
        match event {
            InboxEvent::SessionStart { project_name, .. } => assert_eq!(project_name, "b"),
            _ => panic!("expected SessionStart"),
        }
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        assert!(envelope("something_else").into_inbox_event().is_err());
    }

    #[test]
    fn background_task_complete_metadata_wins_regardless_of_type() {
        let mut env = envelope("activity");
        env.metadata = Some(EnvelopeMetadata {
            delegating_to: None,
            background_task_complete: Some("shell-1".into()),
            ralph_iteration: None,
            ralph_max_iterations: None,
            ultrawork_active: None,
            source: None,
        });
        let event = env.into_inbox_event().unwrap();
        match event {
            InboxEvent::BackgroundTaskComplete { shell_id } => assert_eq!(shell_id, "shell-1"),
            _ => panic!("expected BackgroundTaskComplete"),
        }
    }

    #[test]
    fn agent_blocked_without_question_gets_a_default() {
        let event = envelope("agent_blocked").into_inbox_event().unwrap();
        match event {
            InboxEvent::AgentBlocked { question, .. } => {
                assert_eq!(question, "Waiting for your response...")
            }
            _ => panic!("expected AgentBlocked"),
        }
    }
}

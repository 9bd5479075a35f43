use argus_types::AgentType;

/// Optional side-channel fields carried on an ingress event.
#[derive(Debug, Clone, Default)]
pub struct EventMetadata {
    pub delegating_to: Option<String>,
    pub background_task_complete: Option<String>,
    pub ralph_iteration: Option<u32>,
    pub ralph_max_iterations: Option<u32>,
    pub ultrawork_active: Option<bool>,
    pub source: Option<String>,
}

/// A lifecycle event pushed onto the scheduler's inbox, already validated
/// and decoded from the wire envelope by the ingress surface. The inbox
/// applies these with the same priority the full reconcile pass uses, except
/// here the event's own type has already resolved the ambiguity a transcript
/// scan would otherwise have to infer.
#[derive(Debug, Clone)]
pub enum InboxEvent {
    SessionStart {
        session_id: String,
        project_path: String,
        project_name: String,
        task: Option<String>,
    },
    SessionEnd {
        session_id: String,
        project_path: String,
    },
    AgentSpawn {
        parent_session_id: String,
        project_path: String,
        project_name: String,
        agent_id: String,
        agent_name: Option<String>,
        agent_type: AgentType,
        task: Option<String>,
        metadata: Option<EventMetadata>,
    },
    AgentBlocked {
        session_id: String,
        project_path: String,
        question: String,
    },
    AgentUnblocked {
        session_id: String,
        project_path: String,
    },
    AgentComplete {
        session_id: String,
        project_path: String,
        agent_id: Option<String>,
        agent_name: Option<String>,
        task: Option<String>,
    },
    Activity {
        session_id: String,
        project_path: String,
    },
    BackgroundTaskComplete {
        shell_id: String,
    },
}

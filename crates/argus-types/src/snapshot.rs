use crate::domain::{
    Agent, AgentStatus, AgentType, CompletedWorkItem, Modes, Project, ProjectStatus, TimestampMs,
    TodoList,
};
use crate::ids::{AgentId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable, deeply value-typed view of one agent at the moment the snapshot was taken
/// (I6): no field here aliases the store's internal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegating_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modes: Option<Modes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todos: Option<TodoList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_reset_at: Option<TimestampMs>,
    pub spawned_at: TimestampMs,
    pub last_activity_at: TimestampMs,
    pub working_time: TimestampMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
}

impl AgentView {
    pub fn from_agent(agent: &Agent, now: TimestampMs) -> Self {
        Self {
            id: agent.id.clone(),
            agent_type: agent.agent_type,
            parent_id: agent.parent_id.clone(),
            name: agent.name.clone(),
            status: agent.status,
            task: agent.task.clone(),
            current_activity: agent.current_activity.clone(),
            question: agent.question.clone(),
            delegating_to: agent.delegating_to.clone(),
            modes: agent.modes,
            todos: agent.todos.clone(),
            rate_limit_reset_at: agent.rate_limit_reset_at,
            spawned_at: agent.spawned_at,
            last_activity_at: agent.last_activity_at,
            working_time: agent.working_time(now),
            transcript_path: agent.transcript_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub path: String,
    pub name: String,
    pub status: ProjectStatus,
    pub last_activity_at: TimestampMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_since: Option<TimestampMs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user_message: Option<String>,
    pub agents: BTreeMap<AgentId, AgentView>,
    pub blocked_agent_count: usize,
    pub working_agent_count: usize,
}

impl ProjectView {
    pub fn from_project(project: &Project, now: TimestampMs) -> Self {
        let agents = project
            .agents
            .iter()
            .map(|(id, agent)| (id.clone(), AgentView::from_agent(agent, now)))
            .collect();
        Self {
            id: project.id.clone(),
            path: project.path.clone(),
            name: project.name.clone(),
            status: project.status,
            last_activity_at: project.last_activity_at,
            blocked_since: project.blocked_since,
            last_user_message: project.last_user_message.clone(),
            agents,
            blocked_agent_count: project.blocked_agent_count(),
            working_agent_count: project.working_agent_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub projects: BTreeMap<ProjectId, ProjectView>,
    pub completed_work: Vec<CompletedWorkItem>,
    pub last_updated: TimestampMs,
}

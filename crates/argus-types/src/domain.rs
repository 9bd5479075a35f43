use crate::ids::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wall-clock milliseconds since the Unix epoch. All times in this model are observer-local;
/// transcript timestamps are informational only (clock skew is explicitly not reconciled).
pub type TimestampMs = i64;

pub fn now_ms() -> TimestampMs {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Main,
    #[default]
    Subagent,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Working,
    Blocked,
    RateLimited,
    ServerRunning,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Idle,
    Working,
    Blocked,
    RateLimited,
    ServerRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    pub status: TodoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_form: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCounts {
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
}

/// Snapshot of a TodoWrite call: supersedes any earlier one in full (it is a
/// snapshot, not a delta), so the list and its counts travel together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    pub items: Vec<TodoItem>,
    pub counts: TodoCounts,
}

impl TodoList {
    pub fn from_items(items: Vec<TodoItem>) -> Self {
        let mut counts = TodoCounts::default();
        for item in &items {
            match item.status {
                TodoStatus::Pending => counts.pending += 1,
                TodoStatus::InProgress => counts.in_progress += 1,
                TodoStatus::Completed => counts.completed += 1,
            }
        }
        Self { items, counts }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    #[serde(default)]
    pub ralph: bool,
    #[serde(default)]
    pub ultrawork: bool,
    #[serde(default)]
    pub planning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ralph_iteration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ralph_max_iterations: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AgentId>,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,

    /// Side-table link for a `background` agent: the shell id a later
    /// `backgroundTaskComplete(shellId)` event uses to find this agent.
    #[serde(skip)]
    pub shell_id: Option<String>,
}

impl Agent {
    pub fn new_main(id: AgentId, spawned_at: TimestampMs) -> Self {
        Self {
            id,
            agent_type: AgentType::Main,
            parent_id: None,
            status: AgentStatus::Working,
            name: None,
            task: None,
            current_activity: None,
            question: None,
            delegating_to: None,
            modes: None,
            todos: None,
            rate_limit_reset_at: None,
            spawned_at,
            last_activity_at: spawned_at,
            transcript_path: None,
            shell_id: None,
        }
    }

    /// `now - spawnedAt` for working agents, `lastActivityAt - spawnedAt` for completed ones.
    pub fn working_time(&self, now: TimestampMs) -> TimestampMs {
        let end = match self.status {
            AgentStatus::Complete => self.last_activity_at,
            _ => now,
        };
        (end - self.spawned_at).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: crate::ids::ProjectId,
    pub path: String,
    pub name: String,
    pub status: ProjectStatus,
    pub last_activity_at: TimestampMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_since: Option<TimestampMs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user_message: Option<String>,
    pub agents: BTreeMap<AgentId, Agent>,
}

impl Project {
    pub fn new(id: crate::ids::ProjectId, path: String, name: String, now: TimestampMs) -> Self {
        Self {
            id,
            path,
            name,
            status: ProjectStatus::Idle,
            last_activity_at: now,
            blocked_since: None,
            last_user_message: None,
            agents: BTreeMap::new(),
        }
    }

    pub fn main_agent_id(&self) -> Option<&AgentId> {
        self.agents
            .values()
            .find(|a| a.agent_type == AgentType::Main)
            .map(|a| &a.id)
    }

    pub fn blocked_agent_count(&self) -> usize {
        self.agents
            .values()
            .filter(|a| a.status == AgentStatus::Blocked)
            .count()
    }

    pub fn working_agent_count(&self) -> usize {
        self.agents
            .values()
            .filter(|a| a.status == AgentStatus::Working)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkItem {
    pub id: String,
    pub agent_name: String,
    pub task: String,
    pub completed_at: TimestampMs,
    pub project_id: crate::ids::ProjectId,
    pub project_name: String,
}

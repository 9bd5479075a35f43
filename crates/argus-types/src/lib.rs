//! Domain types shared across the argus workspace: transcript entries, the
//! project/agent graph, and the immutable snapshot handed to subscribers.

pub mod domain;
pub mod entry;
pub mod error;
pub mod ids;
pub mod snapshot;

pub use domain::{
    now_ms, Agent, AgentStatus, AgentType, CompletedWorkItem, Modes, Project, ProjectStatus,
    TimestampMs, TodoCounts, TodoItem, TodoList, TodoStatus,
};
pub use entry::{Block, Entry};
pub use error::{Error, Result};
pub use ids::{AgentId, ProjectId};
pub use snapshot::{AgentView, ProjectView, Snapshot};

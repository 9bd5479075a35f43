//! In-memory project/agent state store: applies the named transitions a
//! reconciler drives off discovery and hook events, enforces the graph's
//! invariants, and derives project status as a pure function of its agents.

mod status;
mod store;

pub use status::derive_project_status;
pub use store::{AgentSpawn, SessionStart, Store, StoreConfig};

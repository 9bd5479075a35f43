//! Dialect-agnostic semantic extractors: pure functions over the canonical
//! `Entry` stream produced by the `claude`/`openclaw` parsers.

mod activity;
mod identity;
mod plan_mode;
mod question;
mod rate_limit;
mod server_running;
mod system_error;
mod task;
mod todos;

pub use activity::current_activity;
pub use identity::agent_name;
pub use plan_mode::is_planning;
pub use question::pending_question;
pub use rate_limit::rate_limit;
pub use server_running::{server_running, ServerRunning};
pub use system_error::system_error;
pub use task::{initial_task, last_user_message};
pub use todos::current_todos;

//! Path normalization and project-identity utilities shared by discovery,
//! the state store, and the CLI.

pub mod path;

pub use path::{
    default_claude_root, default_openclaw_root, display_name, project_id_from_path,
    project_id_from_root, resolve_argus_home,
};

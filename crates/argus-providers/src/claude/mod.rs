pub(crate) mod io;
pub(crate) mod schema;

pub use io::{extract_cwd, parse_claude_transcript};

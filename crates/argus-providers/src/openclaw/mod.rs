pub(crate) mod io;
pub(crate) mod schema;

pub use io::{extract_cwd, is_openclaw_transcript, parse_openclaw_transcript};

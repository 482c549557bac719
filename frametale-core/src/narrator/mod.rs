//! AI narrator.
//!
//! Contains the turn loop, the chat backend seam, history shaping and
//! history compaction.

mod agent;
mod backend;
pub mod compactor;
pub mod history;

pub use agent::{tool_line, Narration, Narrator, NarratorError, PAUSED_NOTICE};
pub use backend::ChatBackend;
pub use compactor::{CompactionError, CompactionPlan, CompactionPolicy};

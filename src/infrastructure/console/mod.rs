//! Console collaborators - tables, prompts and event rendering

pub mod prompts;
pub mod sink;
pub mod table;

pub use prompts::Prompter;
pub use sink::{ConsoleDecision, ConsoleSink};

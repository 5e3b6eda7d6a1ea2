//! Prompt orchestration for Scrivener.
//!
//! One invocation goes through a fixed pipeline:
//!
//! 1. **Assemble** the system prompt from a Markdown template
//! 2. **Normalize** the turn list so the system turn comes first, then
//!    append the user's prompt
//! 3. **Dispatch** to the model directly, or to an [`AgentExecutor`] that
//!    carries the refactor tool set
//! 4. **Accumulate** the answer from the turns the run appended
//! 5. **Log** a transcript to the data folder
//!
//! [`Orchestrator`] exposes the pipeline as a one-shot call and as two
//! streaming chat variants.

pub mod answer;
pub mod chat;
pub mod executor;
pub mod orchestrator;
pub mod prompt;
pub mod toolset;
pub mod transcript;
pub mod turns;

#[cfg(test)]
mod test_helpers;

pub use executor::{AgentExecutor, MAX_ITERATIONS_NOTICE, ModelHandle, ToolLoopExecutor};
pub use orchestrator::{
    ChatRequest, DRY_RUN_PLACEHOLDER, GraphRequest, Orchestrator, RunOutcome, RunRequest,
};
pub use prompt::{PromptAssembler, attach_code, file_type_mention};
pub use toolset::SharedToolSet;
pub use transcript::Transcript;

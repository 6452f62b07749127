/// Runtime orchestrator module - Gateway

mod non_interactive;
mod orchestrator;

pub use non_interactive::{format_result, ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::{run_session, Orchestrator, SessionEnd};

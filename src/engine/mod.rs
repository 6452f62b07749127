// Gateway module for the question-answering engine - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod assembler;
mod intent;
mod matcher;
mod qa;

// Public re-exports - the ONLY way to access engine functionality
pub use assembler::{extract_ticket_key, find_gaps, find_pickups, infer_status, ContextAssembler};
pub use intent::{apply_overrides, Intent, IntentRouter, Override, CLASSIFIER_INSTRUCTION, OVERRIDES};
pub use matcher::{match_deprecations, score, tokenize, MatchMode, MatchResult};
pub use qa::{compose_final_prompt, Answer, QaEngine, ANSWER_INSTRUCTION};

// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod gemini;
mod mock;
mod ollama;
mod traits;

// Public re-exports - the ONLY way to access model functionality
pub use factory::{parse_model_id, ModelFactory, SUPPORTED_PROVIDERS};
pub use gemini::GeminiGenerator;
pub use mock::{GeneratorCall, MockGenerator};
pub use ollama::OllamaGenerator;
pub use traits::TextGenerator;

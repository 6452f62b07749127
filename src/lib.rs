pub mod app;
pub mod cli;
pub mod connectors;
pub mod constants;
pub mod engine;
pub mod models;
pub mod runtime;
pub mod utils;

pub use app::{load_config, Config};
pub use engine::{Intent, QaEngine};
pub use models::{ModelFactory, TextGenerator};
pub use utils::EolError;

// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod gemini;
pub mod storage;

pub use gemini::GeminiExtractor;
pub use storage::LocalStorage;

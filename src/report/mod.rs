pub mod gemini;

pub use gemini::GeminiReporter;

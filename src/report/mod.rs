//! Natural-language report generation from an aggregated document.

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiClient, GenerationError};

use crate::models::{AggregationResult, TimeWindow};

/// Ask the generator for a status report on `tasks`.
pub async fn request_report(
    generator: &GeminiClient,
    tasks: &AggregationResult,
    window: Option<&TimeWindow>,
) -> Result<String, GenerationError> {
    let prompt = prompt::build_prompt(tasks, window)?;
    generator.generate(&prompt).await
}

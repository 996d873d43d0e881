pub mod analysis;
pub mod json_extract;
pub mod llm_service;
pub mod photo_lookup;
pub mod prompt_builder;
pub mod report_writer;

pub use analysis::AnalysisOrchestrator;
pub use llm_service::{LlmService, TextGenerator};
pub use photo_lookup::{Enrichment, GooglePlacesClient, PhotoLookup, PhotoReference};
pub use prompt_builder::{build_prompt, PROMPT_VERSION};
pub use report_writer::ReportWriter;

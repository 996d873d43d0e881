pub mod pipeline;

pub use pipeline::{ApiResponse, PipelineCoordinator};

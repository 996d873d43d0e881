pub mod analysis;
pub mod loaders;
pub mod review;
pub mod target;

pub use analysis::{AnalysisResult, Sentiment};
pub use loaders::load_targets;
pub use review::{average_rating, ReviewRecord};
pub use target::{Target, TargetList};

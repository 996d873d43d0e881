//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理 Vec<Target>)
//!     ↓
//! workflow::PipelineCoordinator (处理单个请求)
//!     ↓
//! acquisition / services (能力层：采集 / 分析 / 照片)
//!     ↓
//! browser (基础设施：会话工厂、会话池)
//! ```

pub mod batch_runner;

pub use batch_runner::{App, RunStats};

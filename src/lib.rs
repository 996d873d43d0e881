//! # Review Insight
//!
//! 从第三方页面采集餐厅评论，并借助文本生成模型整理成结构化报告
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Browser）
//! - `browser/` - 浏览器会话能力（`BrowserSession` / `SessionFactory`）
//! - `SessionPool` - 限制同时存活的浏览器进程数量
//!
//! ### ② 业务能力层（Acquisition / Services）
//! - `acquisition/` - 采集状态机：导航 → 等待评论区 → 滚动 → 提取
//! - `services/` - 提示词构建、模型调用、JSON 定位与校验、照片补充
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 单个请求的流水线：采集 → 分析，以及对外响应信封
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 批量运行多个目标，汇总统计
//!
//! ## 模块结构

pub mod acquisition;
pub mod browser;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use acquisition::{AcquisitionController, AcquisitionSettings};
pub use config::Config;
pub use error::{AcquisitionError, AnalysisError, PipelineError, Result};
pub use models::{AnalysisResult, ReviewRecord, Sentiment, Target};
pub use orchestrator::App;
pub use services::AnalysisOrchestrator;
pub use workflow::{ApiResponse, PipelineCoordinator};

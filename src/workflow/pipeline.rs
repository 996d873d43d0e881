//! 流水线协调 - 流程层
//!
//! 一个请求 = 一次采集 + 至多一次分析，严格顺序执行：
//! 1. 采集失败 → 直接返回，不进入分析
//! 2. 采集到 0 条评论 → `NoReviewsFound`，不调用模型
//! 3. 分析失败 → 原样返回，没有备用模型也没有重试

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::acquisition::AcquisitionController;
use crate::error::{AcquisitionError, Result};
use crate::models::{AnalysisResult, ReviewRecord};
use crate::services::AnalysisOrchestrator;

/// 对外响应信封：`{ success: true, data }` 或 `{ success: false, error }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for ApiResponse<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

/// 流水线协调器
///
/// - 持有采集控制器和分析编排器
/// - 不持有任何浏览器会话
/// - 请求之间不共享状态
pub struct PipelineCoordinator {
    acquisition: AcquisitionController,
    analysis: AnalysisOrchestrator,
}

impl PipelineCoordinator {
    pub fn new(acquisition: AcquisitionController, analysis: AnalysisOrchestrator) -> Self {
        Self {
            acquisition,
            analysis,
        }
    }

    /// 对外边界：采集评论
    pub async fn acquire_reviews(&self, url: &str) -> ApiResponse<Vec<ReviewRecord>> {
        let url = url.trim();
        if url.is_empty() {
            return ApiResponse::fail("缺少 URL");
        }
        self.acquisition.acquire(url).await.into()
    }

    /// 对外边界：分析评论
    pub async fn analyze_reviews(
        &self,
        reviews: &[ReviewRecord],
        place_id: Option<&str>,
    ) -> ApiResponse<AnalysisResult> {
        if reviews.is_empty() {
            return ApiResponse::fail(AcquisitionError::NoReviewsFound.to_string());
        }
        self.analysis.analyze(reviews, place_id).await.into()
    }

    /// 完整执行一次请求，返回分类错误
    pub async fn run(&self, url: &str, place_id: Option<&str>) -> Result<AnalysisResult> {
        let reviews = self.acquisition.acquire(url).await?;

        if reviews.is_empty() {
            warn!("⚠️ 没有采集到任何评论，跳过分析: {}", url);
            return Err(AcquisitionError::NoReviewsFound.into());
        }
        info!("✓ 采集到 {} 条评论，进入分析", reviews.len());

        Ok(self.analysis.analyze(&reviews, place_id).await?)
    }
}

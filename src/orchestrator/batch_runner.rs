//! 批量运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：结果日志、会话池、采集控制器、分析编排器、流水线
//! 2. **并发控制**：使用 Semaphore 限制同时运行的流水线数量（与会话池容量一致）
//! 3. **结果记录**：每个目标一行 JSON 写入结果日志
//! 4. **全局统计**：汇总成功 / 失败数量，失败按错误类别计数
//!
//! 每个目标是一条独立的流水线，目标之间不共享浏览器会话。

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::acquisition::{AcquisitionController, AcquisitionSettings};
use crate::browser::{ChromiumSessionFactory, SessionFactory, SessionPool};
use crate::config::Config;
use crate::models::{AnalysisResult, Target};
use crate::services::{AnalysisOrchestrator, GooglePlacesClient, LlmService, ReportWriter};
use crate::utils::logging::{
    init_log_file, log_startup, log_targets_loaded, print_final_stats, truncate_text,
};
use crate::workflow::{ApiResponse, PipelineCoordinator};

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    /// 错误类别 → 失败目标数
    pub failures: BTreeMap<&'static str, usize>,
}

impl RunStats {
    fn record_failure(&mut self, kind: &'static str) {
        self.failed += 1;
        *self.failures.entry(kind).or_default() += 1;
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: Arc<PipelineCoordinator>,
    writer: Arc<ReportWriter>,
}

impl App {
    /// 初始化应用：启动本地浏览器工厂、会话池和模型客户端
    pub async fn initialize(config: Config) -> Result<Self> {
        let factory: Arc<dyn SessionFactory> = Arc::new(ChromiumSessionFactory::new(&config));
        let pool = SessionPool::new(
            factory,
            config.max_browser_sessions,
            config.session_acquire_timeout(),
        );
        let acquisition =
            AcquisitionController::new(Arc::new(pool), AcquisitionSettings::from_config(&config));

        let mut analysis =
            AnalysisOrchestrator::new(Arc::new(LlmService::new(&config)), config.llm_timeout());
        if let Some(places) = GooglePlacesClient::from_config(&config)? {
            analysis = analysis.with_photo_lookup(Arc::new(places));
        }

        Self::with_pipeline(config, PipelineCoordinator::new(acquisition, analysis))
    }

    /// 使用现成的流水线初始化（测试时注入假实现）
    pub fn with_pipeline(config: Config, pipeline: PipelineCoordinator) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        Ok(Self {
            writer: Arc::new(ReportWriter::with_path(config.output_log_file.clone())),
            pipeline: Arc::new(pipeline),
            config,
        })
    }

    /// 运行全部目标
    pub async fn run(&self, targets: Vec<Target>) -> Result<RunStats> {
        if targets.is_empty() {
            warn!("⚠️ 没有待分析的目标，程序结束");
            return Ok(RunStats::default());
        }

        let max_concurrent = self.config.max_browser_sessions.max(1);
        log_targets_loaded(targets.len(), max_concurrent);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut stats = RunStats {
            total: targets.len(),
            ..Default::default()
        };
        let mut handles = Vec::new();

        for (idx, target) in targets.into_iter().enumerate() {
            let target_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let pipeline = Arc::clone(&self.pipeline);
            let writer = Arc::clone(&self.writer);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                info!("[目标 {}] 开始: {}", target_index, target.url);

                let outcome = pipeline
                    .run(&target.url, target.place_id.as_deref())
                    .await;
                let failure_kind = outcome.as_ref().err().map(|e| e.kind());
                let response: ApiResponse<AnalysisResult> = outcome.into();
                log_outcome(target_index, &response);

                if let Err(e) = writer.write(&target, &response) {
                    error!("[目标 {}] 写入结果失败: {}", target_index, e);
                }
                failure_kind
            });
            handles.push((target_index, handle));
        }

        for (target_index, handle) in handles {
            match handle.await {
                Ok(None) => stats.success += 1,
                Ok(Some(kind)) => stats.record_failure(kind),
                Err(e) => {
                    error!("[目标 {}] 任务执行失败: {}", target_index, e);
                    stats.record_failure("TaskAborted");
                }
            }
        }

        print_final_stats(&stats, self.writer.path());
        Ok(stats)
    }
}

fn log_outcome(target_index: usize, response: &ApiResponse<AnalysisResult>) {
    match (&response.data, &response.error) {
        (Some(result), _) => {
            info!(
                "[目标 {}] ✅ {} / 平均评分 {:.1}",
                target_index, result.sentiment, result.average_rating
            );
            info!("[目标 {}] 摘要: {}", target_index, truncate_text(&result.summary, 80));
        }
        (None, error) => {
            error!(
                "[目标 {}] ❌ {}",
                target_index,
                error.as_deref().unwrap_or("未知错误")
            );
        }
    }
}

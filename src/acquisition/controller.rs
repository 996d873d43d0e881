//! 评论采集控制器
//!
//! 线性状态机，没有回退：
//!
//! ```text
//! Launch → Navigate → AwaitReviewSection → ScrollExpand → Extract → (Close)
//! ```
//!
//! `Close` 在每条退出路径上都会执行：成功、分类错误，以及驱动过程中的 panic。
//! 任何错误都不在这里重试，重试策略属于调用方。

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::acquisition::rating::parse_rating_label;
use crate::acquisition::scripts::{self, RawReview};
use crate::acquisition::selectors::SelectorContract;
use crate::browser::{eval_as, BrowserSession, PoolExhausted, SessionFactory};
use crate::config::Config;
use crate::error::{AcquisitionError, SessionError};
use crate::models::ReviewRecord;

/// 采集状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Launch,
    Navigate,
    AwaitReviewSection,
    ScrollExpand,
    Extract,
    Close,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionState::Launch => "Launch",
            AcquisitionState::Navigate => "Navigate",
            AcquisitionState::AwaitReviewSection => "AwaitReviewSection",
            AcquisitionState::ScrollExpand => "ScrollExpand",
            AcquisitionState::Extract => "Extract",
            AcquisitionState::Close => "Close",
        };
        f.write_str(name)
    }
}

/// 单次采集返回的评论数上限，与页面上有多少评论元素无关
pub const MAX_REVIEWS_CAP: usize = 20;

/// 采集参数
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    pub scroll_rounds: usize,
    pub scroll_settle: Duration,
    pub max_reviews: usize,
    pub contract: SelectorContract,
}

impl AcquisitionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            navigation_timeout: config.navigation_timeout(),
            selector_timeout: config.selector_timeout(),
            scroll_rounds: config.scroll_rounds,
            scroll_settle: config.scroll_settle(),
            max_reviews: config.max_reviews.min(MAX_REVIEWS_CAP),
            contract: SelectorContract::default(),
        }
    }
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 评论采集控制器
///
/// 不持有会话：每次 `acquire` 从工厂取一个新会话，用完即释放。
pub struct AcquisitionController {
    factory: Arc<dyn SessionFactory>,
    settings: AcquisitionSettings,
}

impl AcquisitionController {
    pub fn new(factory: Arc<dyn SessionFactory>, settings: AcquisitionSettings) -> Self {
        Self { factory, settings }
    }

    /// 从 `source_url` 采集最多 `max_reviews` 条评论（DOM 顺序）
    ///
    /// 空列表也是成功结果，是否视为失败由流水线决定。
    pub async fn acquire(&self, source_url: &str) -> Result<Vec<ReviewRecord>, AcquisitionError> {
        let started = Instant::now();
        info!("🔍 开始采集评论: {}", source_url);

        log_state(AcquisitionState::Launch);
        let mut session = self.factory.launch().await.map_err(classify_launch_error)?;

        let outcome = AssertUnwindSafe(self.drive(session.as_mut(), source_url))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let message = panic_message(panic.as_ref());
                error!("采集过程中发生 panic: {}", message);
                Err(AcquisitionError::UnexpectedFault(anyhow::anyhow!(
                    "采集过程中发生 panic: {}",
                    message
                )))
            });

        log_state(AcquisitionState::Close);
        if let Err(e) = session.close().await {
            warn!("关闭浏览器会话失败: {}", e);
        }

        match &outcome {
            Ok(reviews) => info!(
                "✓ 采集完成: {} 条评论，耗时 {:.1}s",
                reviews.len(),
                started.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("❌ 采集失败: {}", e),
        }
        outcome
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        source_url: &str,
    ) -> Result<Vec<ReviewRecord>, AcquisitionError> {
        let settings = &self.settings;

        log_state(AcquisitionState::Navigate);
        session
            .navigate(source_url, settings.navigation_timeout)
            .await
            .map_err(|e| match e {
                SessionError::Timeout(deadline) => AcquisitionError::NavigationTimeout {
                    url: source_url.to_string(),
                    deadline,
                },
                other => AcquisitionError::UnexpectedFault(other.into()),
            })?;

        log_state(AcquisitionState::AwaitReviewSection);
        let container = settings.contract.review_container;
        session
            .wait_for_selector(container, settings.selector_timeout)
            .await
            .map_err(|e| match e {
                SessionError::Timeout(deadline) => AcquisitionError::SelectorNotFound {
                    selector: container.to_string(),
                    deadline,
                },
                other => AcquisitionError::UnexpectedFault(other.into()),
            })?;
        debug!("评论区已出现 (选择器约定 {})", settings.contract.version);

        log_state(AcquisitionState::ScrollExpand);
        for round in 1..=settings.scroll_rounds {
            let height = session
                .evaluate(scripts::SCROLL_TO_BOTTOM)
                .await
                .map_err(|e| AcquisitionError::UnexpectedFault(e.into()))?;
            debug!(
                "滚动 {}/{} (文档高度 {})",
                round, settings.scroll_rounds, height
            );
            sleep(settings.scroll_settle).await;
        }

        log_state(AcquisitionState::Extract);
        let max_reviews = settings.max_reviews.min(MAX_REVIEWS_CAP);
        let script = scripts::extract_reviews(&settings.contract, max_reviews);
        let raw: Vec<RawReview> = eval_as(session, &script)
            .await
            .map_err(|e| AcquisitionError::UnexpectedFault(e.into()))?;
        debug!("页面返回 {} 个评论元素", raw.len());

        Ok(raw
            .into_iter()
            .take(max_reviews)
            .map(to_record)
            .collect())
    }
}

fn to_record(raw: RawReview) -> ReviewRecord {
    ReviewRecord::new(
        raw.text.trim(),
        parse_rating_label(&raw.rating_label),
        raw.date.trim(),
    )
}

fn classify_launch_error(err: anyhow::Error) -> AcquisitionError {
    match err.downcast::<PoolExhausted>() {
        Ok(PoolExhausted { capacity, waited }) => {
            AcquisitionError::PoolExhausted { capacity, waited }
        }
        Err(err) => AcquisitionError::LaunchError(err),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_state(state: AcquisitionState) {
    debug!("采集状态 → {}", state);
}

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::browser::session::{BrowserSession, SessionFactory};
use crate::config::Config;
use crate::error::SessionError;

/// 选择器 / readyState 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 启动本地无头浏览器的会话工厂
///
/// 每次 `launch` 都会启动一个独立的浏览器进程。
#[derive(Debug, Clone)]
pub struct ChromiumSessionFactory {
    executable: Option<PathBuf>,
    headless: bool,
}

impl ChromiumSessionFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            executable: config.browser_executable.as_ref().map(PathBuf::from),
            headless: config.headless,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        builder = if self.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",             // 容器内没有沙盒权限
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",  // 防止共享内存不足
            ])
            .build()
            .map_err(|e| {
                error!("配置无头浏览器失败: {}", e);
                anyhow::anyhow!("配置无头浏览器失败: {}", e)
            })
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        info!("🚀 启动无头浏览器...");

        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            anyhow::anyhow!("启动无头浏览器失败: {}", e)
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                error!("创建页面失败: {}", e);
                let mut session = ChromiumSession {
                    browser: Some(browser),
                    page: None,
                    handler_task,
                };
                let _ = session.close().await;
                return Err(anyhow::anyhow!("创建页面失败: {}", e));
            }
        };

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler_task,
        }))
    }
}

/// 持有一个浏览器进程和其中唯一的页面
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, SessionError> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::Protocol(anyhow::anyhow!("会话已关闭")))
    }

    async fn eval_value(&self, script: &str) -> Result<JsonValue, SessionError> {
        let result = self.page()?.evaluate(script).await?;
        Ok(result.into_value()?)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, deadline: Duration) -> Result<(), SessionError> {
        debug!("导航到: {}", url);
        let this = &*self;
        let navigation = async {
            let response = this.page()?.execute(NavigateParams::new(url)).await?;
            if let Some(error_text) = response.result.error_text.clone() {
                return Err(SessionError::Navigation(error_text));
            }

            // 只等 DOM 解析完成，不等图片等子资源
            poll_until(move || async move {
                let state = this.eval_value("document.readyState").await?;
                Ok::<_, SessionError>(matches!(
                    state.as_str(),
                    Some("interactive") | Some("complete")
                ))
            })
            .await
        };

        match timeout(deadline, navigation).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(deadline)),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        deadline: Duration,
    ) -> Result<(), SessionError> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let script = script.as_str();
        let this = &*self;

        let polling = poll_until(move || async move {
            Ok::<_, SessionError>(this.eval_value(script).await?.as_bool() == Some(true))
        });

        match timeout(deadline, polling).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(deadline)),
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, SessionError> {
        self.eval_value(script).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.page = None;
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser.close().await;
                if let Err(e) = browser.wait().await {
                    warn!("等待浏览器进程退出失败: {}", e);
                }
                closed.map(|_| ()).map_err(SessionError::from)
            }
            None => Ok(()),
        };
        self.handler_task.abort();
        debug!("浏览器会话已关闭");
        result
    }
}

/// 按 [`POLL_INTERVAL`] 重复执行 `check`，直到返回 `true`
///
/// 客户端跳转时页面执行上下文会被销毁，期间的脚本错误只记录后继续轮询；
/// 只有导航失败会提前结束。截止时间由调用方的 `timeout` 控制。
async fn poll_until<F, Fut>(mut check: F) -> Result<(), SessionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, SessionError>>,
{
    loop {
        match check().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(SessionError::Navigation(reason)) => return Err(SessionError::Navigation(reason)),
            Err(e) => debug!("轮询时脚本执行失败，继续等待: {}", e),
        }
        sleep(POLL_INTERVAL).await;
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Browser 自身的 Drop 会结束子进程，这里只需停止事件循环
        self.handler_task.abort();
    }
}

//! 浏览器会话池 - 准入控制
//!
//! 每个会话都是一个重量级浏览器进程。会话池限制同时存活的会话数量：
//! 超出容量的请求最多排队 `acquire_timeout`，之后以 [`PoolExhausted`] 拒绝。
//! 会话不跨请求复用，关闭（或丢弃）会话时归还名额。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::browser::session::{BrowserSession, SessionFactory};
use crate::error::SessionError;

/// 会话池满且等待超时
#[derive(Debug, Error)]
#[error("浏览器会话池已满 (容量 {capacity})，等待 {waited:?}")]
pub struct PoolExhausted {
    pub capacity: usize,
    pub waited: Duration,
}

/// 对任意 [`SessionFactory`] 加上并发上限
pub struct SessionPool {
    inner: Arc<dyn SessionFactory>,
    semaphore: Arc<Semaphore>,
    capacity: usize,
    acquire_timeout: Duration,
}

impl SessionPool {
    pub fn new(inner: Arc<dyn SessionFactory>, capacity: usize, acquire_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            acquire_timeout,
        }
    }

    /// 当前空闲名额
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    async fn admit(&self) -> Result<OwnedSemaphorePermit, PoolExhausted> {
        let exhausted = || PoolExhausted {
            capacity: self.capacity,
            waited: self.acquire_timeout,
        };

        if self.acquire_timeout.is_zero() {
            return self.semaphore.clone().try_acquire_owned().map_err(|_| exhausted());
        }

        match timeout(self.acquire_timeout, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            // semaphore 从不关闭，Err 只可能来自超时
            _ => Err(exhausted()),
        }
    }
}

#[async_trait]
impl SessionFactory for SessionPool {
    async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>> {
        let permit = self.admit().await.map_err(|e| {
            warn!("⚠️ {}", e);
            e
        })?;
        debug!(
            "获得会话名额，剩余 {}/{}",
            self.semaphore.available_permits(),
            self.capacity
        );

        // 启动失败时 permit 随之丢弃，名额自动归还
        let session = self.inner.launch().await?;
        Ok(Box::new(PooledSession {
            inner: session,
            permit: Some(permit),
        }))
    }
}

/// 持有名额的会话，关闭或丢弃时归还名额
struct PooledSession {
    inner: Box<dyn BrowserSession>,
    permit: Option<OwnedSemaphorePermit>,
}

#[async_trait]
impl BrowserSession for PooledSession {
    async fn navigate(&mut self, url: &str, deadline: Duration) -> Result<(), SessionError> {
        self.inner.navigate(url, deadline).await
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        deadline: Duration,
    ) -> Result<(), SessionError> {
        self.inner.wait_for_selector(selector, deadline).await
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, SessionError> {
        self.inner.evaluate(script).await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let result = self.inner.close().await;
        self.permit.take();
        result
    }
}

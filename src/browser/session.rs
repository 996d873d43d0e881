//! 浏览器会话能力
//!
//! 采集层只依赖这里的两个 trait，不直接接触 chromiumoxide，测试时可以替换为假实现。

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::SessionError;

/// 一个独占的浏览器会话
#[async_trait]
pub trait BrowserSession: Send {
    /// 导航到 `url`，DOM 解析完成即返回（不等待所有子资源）
    async fn navigate(&mut self, url: &str, deadline: Duration) -> Result<(), SessionError>;

    /// 轮询直到 `selector` 出现在页面中，超过 `deadline` 返回 [`SessionError::Timeout`]
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        deadline: Duration,
    ) -> Result<(), SessionError>;

    /// 在页面中执行 JS 表达式并返回 JSON 结果
    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, SessionError>;

    /// 释放会话。调用后会话不可再用。
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// 会话工厂，每次调用得到一个全新的隔离会话
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>>;
}

/// 执行 JS 并反序列化为指定类型
pub async fn eval_as<T: DeserializeOwned>(
    session: &mut dyn BrowserSession,
    script: &str,
) -> Result<T, SessionError> {
    let value = session.evaluate(script).await?;
    Ok(serde_json::from_value(value)?)
}

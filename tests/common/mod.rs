//! 测试用的假实现：浏览器会话、文本生成、照片查询
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use review_insight::acquisition::scripts::SCROLL_TO_BOTTOM;
use review_insight::acquisition::{AcquisitionController, AcquisitionSettings};
use review_insight::browser::{BrowserSession, SessionFactory};
use review_insight::error::SessionError;
use review_insight::services::{AnalysisOrchestrator, PhotoLookup, PhotoReference, TextGenerator};
use serde_json::{json, Value as JsonValue};

// ========== 浏览器 ==========

/// 会话行为
#[derive(Debug, Clone)]
pub enum Navigation {
    Ok,
    Timeout,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct PageBehavior {
    pub navigation: Navigation,
    pub selector_present: bool,
    /// 提取脚本返回的原始评论（`{text, rating_label, date}`）
    pub reviews: Vec<JsonValue>,
    pub panic_on_extract: bool,
    /// `close` 返回错误（浏览器进程已经退出等）
    pub close_fails: bool,
}

impl PageBehavior {
    pub fn with_reviews(reviews: Vec<JsonValue>) -> Self {
        Self {
            navigation: Navigation::Ok,
            selector_present: true,
            reviews,
            panic_on_extract: false,
            close_fails: false,
        }
    }
}

/// 所有会话共享的计数
#[derive(Debug, Default)]
pub struct SessionLog {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub scrolls: AtomicUsize,
    pub extracts: AtomicUsize,
}

impl SessionLog {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn extracts(&self) -> usize {
        self.extracts.load(Ordering::SeqCst)
    }
}

pub struct FakeSession {
    behavior: PageBehavior,
    log: Arc<SessionLog>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, _url: &str, deadline: Duration) -> Result<(), SessionError> {
        match &self.behavior.navigation {
            Navigation::Ok => Ok(()),
            Navigation::Timeout => Err(SessionError::Timeout(deadline)),
            Navigation::Failed(reason) => Err(SessionError::Navigation(reason.clone())),
        }
    }

    async fn wait_for_selector(
        &mut self,
        _selector: &str,
        deadline: Duration,
    ) -> Result<(), SessionError> {
        if self.behavior.selector_present {
            Ok(())
        } else {
            Err(SessionError::Timeout(deadline))
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<JsonValue, SessionError> {
        if script == SCROLL_TO_BOTTOM {
            self.log.scrolls.fetch_add(1, Ordering::SeqCst);
            return Ok(json!(4096));
        }
        if script.contains("querySelectorAll") {
            self.log.extracts.fetch_add(1, Ordering::SeqCst);
            if self.behavior.panic_on_extract {
                panic!("extract script crashed");
            }
            return Ok(JsonValue::Array(self.behavior.reviews.clone()));
        }
        Err(SessionError::Protocol(anyhow::anyhow!("unexpected script")))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        if self.behavior.close_fails {
            return Err(SessionError::Protocol(anyhow::anyhow!("browser process already exited")));
        }
        Ok(())
    }
}

pub struct FakeFactory {
    pub behavior: PageBehavior,
    pub log: Arc<SessionLog>,
    pub fail_launch: bool,
}

impl FakeFactory {
    pub fn new(behavior: PageBehavior) -> Self {
        Self {
            behavior,
            log: Arc::new(SessionLog::default()),
            fail_launch: false,
        }
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            anyhow::bail!("chrome executable not found");
        }
        self.log.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            behavior: self.behavior.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

/// 原始评论元素
pub fn raw_review(text: &str, rating_label: &str, date: &str) -> JsonValue {
    json!({ "text": text, "rating_label": rating_label, "date": date })
}

/// `n` 条评分为 `rating` 的原始评论
pub fn raw_reviews(n: usize, rating: u8) -> Vec<JsonValue> {
    (0..n)
        .map(|i| raw_review(&format!("review #{}", i), &format!("{} stars", rating), "a week ago"))
        .collect()
}

/// 滚动等待极短的采集参数
pub fn fast_settings() -> AcquisitionSettings {
    AcquisitionSettings {
        scroll_settle: Duration::from_millis(1),
        ..AcquisitionSettings::default()
    }
}

pub fn controller(factory: Arc<dyn SessionFactory>) -> AcquisitionController {
    AcquisitionController::new(factory, fast_settings())
}

// ========== 文本生成 ==========

pub enum Reply {
    Text(String),
    Error(String),
    Slow(Duration),
}

pub struct FakeGenerator {
    reply: Reply,
    pub calls: AtomicUsize,
    pub last_prompt: Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(Reply::Text(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Reply::Error(message.into()))
    }

    pub fn slow(delay: Duration) -> Self {
        Self::new(Reply::Slow(delay))
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn submit(&self, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Error(message) => Err(anyhow::anyhow!("{}", message)),
            Reply::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("{}".to_string())
            }
        }
    }
}

/// 一个合法的模型响应
pub fn valid_model_reply() -> String {
    json!({
        "sentiment": "positive",
        "positive_keywords": ["broth", "friendly staff"],
        "negative_keywords": ["wait time"],
        "summary": "Guests love the rich broth. Service is friendly. Expect a queue at peak hours.",
        "mentioned_menu_items": ["tonkotsu ramen", "gyoza"],
        "recommended_dishes": ["tonkotsu ramen"],
    })
    .to_string()
}

pub fn orchestrator(generator: Arc<dyn TextGenerator>) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(generator, Duration::from_secs(5))
}

// ========== 照片 ==========

pub enum PhotoBehavior {
    Found(String),
    NoPhotos,
    Fails,
}

pub struct FakePhotos {
    behavior: PhotoBehavior,
    pub lookups: AtomicUsize,
}

impl FakePhotos {
    pub fn new(behavior: PhotoBehavior) -> Self {
        Self {
            behavior,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoLookup for FakePhotos {
    async fn lookup(&self, _place_id: &str) -> anyhow::Result<Option<PhotoReference>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            PhotoBehavior::Found(reference) => Ok(Some(PhotoReference(reference.clone()))),
            PhotoBehavior::NoPhotos => Ok(None),
            PhotoBehavior::Fails => anyhow::bail!("connection reset by peer"),
        }
    }

    fn photo_url(&self, reference: &PhotoReference) -> anyhow::Result<String> {
        Ok(format!("https://photos.example/{}?maxwidth=800", reference.0))
    }
}

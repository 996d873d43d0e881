//! 地点照片查询 - 业务能力层
//!
//! 照片只是锦上添花：查询失败由调用方记录日志后降级，从不影响分析结果。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;

/// 照片引用（由地点详情接口返回的不透明字符串）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoReference(pub String);

/// 照片查询能力
#[async_trait]
pub trait PhotoLookup: Send + Sync {
    /// 查询地点的第一张照片
    async fn lookup(&self, place_id: &str) -> Result<Option<PhotoReference>>;

    /// 把照片引用转换成可直接展示的图片地址
    fn photo_url(&self, reference: &PhotoReference) -> Result<String>;
}

/// 照片补充的结果，未补充的原因只用于日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Enriched(Vec<String>),
    NotEnriched(String),
}

/// Google Places 地点详情 + 照片接口
pub struct GooglePlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_width: u32,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    photos: Vec<PhotoEntry>,
}

#[derive(Debug, Deserialize)]
struct PhotoEntry {
    photo_reference: String,
}

impl GooglePlacesClient {
    /// 未配置 API key 时返回 `None`
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(api_key) = config.places_api_key.clone().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Some(Self {
            client,
            base_url: config.places_api_base_url.trim_end_matches('/').to_string(),
            api_key,
            max_width: config.photo_max_width,
        }))
    }
}

#[async_trait]
impl PhotoLookup for GooglePlacesClient {
    async fn lookup(&self, place_id: &str) -> Result<Option<PhotoReference>> {
        let url = Url::parse_with_params(
            &format!("{}/details/json", self.base_url),
            &[
                ("place_id", place_id),
                ("fields", "photos"),
                ("key", self.api_key.as_str()),
            ],
        )?;

        debug!("查询地点照片: {}", place_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("地点详情请求失败")?
            .error_for_status()
            .context("地点详情接口返回错误状态")?;

        let details: DetailsResponse = response.json().await.context("地点详情响应解析失败")?;

        match details.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(None),
            other => anyhow::bail!(
                "地点详情接口返回 {}: {}",
                other,
                details.error_message.unwrap_or_default()
            ),
        }

        Ok(details
            .result
            .and_then(|r| r.photos.into_iter().next())
            .map(|p| PhotoReference(p.photo_reference)))
    }

    fn photo_url(&self, reference: &PhotoReference) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/photo", self.base_url),
            &[
                ("maxwidth", self.max_width.to_string().as_str()),
                ("photo_reference", reference.0.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )?;
        Ok(url.to_string())
    }
}

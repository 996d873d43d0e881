//! 分析编排
//!
//! 评论 → 提示词 → 模型 → JSON 定位 → 结构校验 → 合并平均分 → 照片补充。
//! 只有照片补充会在本地吞掉错误；其余失败按分类返回，不重试。

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value as JsonValue};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::models::{average_rating, AnalysisResult, ReviewRecord, Sentiment};
use crate::services::json_extract::find_json_object;
use crate::services::photo_lookup::{Enrichment, PhotoLookup};
use crate::services::prompt_builder::{build_prompt, PROMPT_VERSION};
use crate::services::llm_service::TextGenerator;
use crate::utils::logging::truncate_text;

/// 分析编排器
pub struct AnalysisOrchestrator {
    generator: Arc<dyn TextGenerator>,
    photos: Option<Arc<dyn PhotoLookup>>,
    model_timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, model_timeout: Duration) -> Self {
        Self {
            generator,
            photos: None,
            model_timeout,
        }
    }

    pub fn with_photo_lookup(mut self, photos: Arc<dyn PhotoLookup>) -> Self {
        self.photos = Some(photos);
        self
    }

    pub async fn analyze(
        &self,
        reviews: &[ReviewRecord],
        place_id: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let average = average_rating(reviews);
        let unrated = reviews.iter().filter(|r| r.rating == 0).count();
        if unrated > 0 {
            warn!("{} 条评论没有可解析的评分，按 0 分计入平均值", unrated);
        }
        info!(
            "📊 开始分析 {} 条评论 (平均评分 {:.1}, 提示词 {})",
            reviews.len(),
            average,
            PROMPT_VERSION
        );

        let prompt = build_prompt(reviews);
        let raw = match timeout(self.model_timeout, self.generator.submit(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(AnalysisError::ModelCallError(e)),
            Err(_) => {
                return Err(AnalysisError::ModelCallError(anyhow::anyhow!(
                    "模型调用超时 ({:?})",
                    self.model_timeout
                )))
            }
        };
        debug!("模型原始响应: {}", truncate_text(&raw, 200));

        let payload = parse_model_response(&raw)?;
        let mut result = validate_payload(payload, average)?;

        if let Some(place_id) = place_id {
            match self.enrich(place_id).await {
                Enrichment::Enriched(urls) => {
                    debug!("照片补充成功: {} 张", urls.len());
                    result.photo_urls = Some(urls);
                }
                Enrichment::NotEnriched(reason) => {
                    warn!("⚠️ 照片补充跳过 ({}): {}", place_id, reason);
                }
            }
        }

        info!(
            "✓ 分析完成: sentiment={}, 平均评分 {:.1}",
            result.sentiment, result.average_rating
        );
        Ok(result)
    }

    /// 尝试为地点补充一张照片，任何失败都转成 `NotEnriched`
    pub async fn enrich(&self, place_id: &str) -> Enrichment {
        let Some(photos) = &self.photos else {
            return Enrichment::NotEnriched("未配置照片查询".to_string());
        };

        match photos.lookup(place_id).await {
            Ok(Some(reference)) => match photos.photo_url(&reference) {
                Ok(url) => Enrichment::Enriched(vec![url]),
                Err(e) => Enrichment::NotEnriched(format!("无法生成照片地址: {:#}", e)),
            },
            Ok(None) => Enrichment::NotEnriched("地点没有照片".to_string()),
            Err(e) => Enrichment::NotEnriched(format!("{:#}", e)),
        }
    }
}

/// 定位并解析模型响应中的第一个 JSON 对象
pub fn parse_model_response(raw: &str) -> Result<JsonValue, AnalysisError> {
    let candidate = find_json_object(raw).ok_or_else(|| {
        AnalysisError::MalformedModelResponse(format!(
            "响应中没有 JSON 对象: {}",
            truncate_text(raw, 80)
        ))
    })?;

    serde_json::from_str(candidate)
        .map_err(|e| AnalysisError::MalformedModelResponse(format!("JSON 解析失败: {}", e)))
}

/// 校验结构并合并平均评分
///
/// `summary` 与 `sentiment` 必须存在且类型正确；四个数组字段缺失或类型不对时视为空。
/// 模型给出的 `average_rating` 一律忽略。
pub fn validate_payload(
    payload: JsonValue,
    average_rating: f64,
) -> Result<AnalysisResult, AnalysisError> {
    let JsonValue::Object(mut object) = payload else {
        return Err(AnalysisError::ValidationError(
            "顶层不是 JSON 对象".to_string(),
        ));
    };

    let summary = match object.remove("summary") {
        Some(JsonValue::String(summary)) if !summary.trim().is_empty() => summary.trim().to_string(),
        Some(JsonValue::String(_)) => {
            return Err(AnalysisError::ValidationError("summary 为空".to_string()))
        }
        Some(other) => {
            return Err(AnalysisError::ValidationError(format!(
                "summary 必须是字符串，实际为 {}",
                json_type(&other)
            )))
        }
        None => return Err(AnalysisError::ValidationError("缺少 summary 字段".to_string())),
    };

    let sentiment = match object.remove("sentiment") {
        Some(JsonValue::String(token)) => token
            .parse::<Sentiment>()
            .map_err(AnalysisError::ValidationError)?,
        Some(other) => {
            return Err(AnalysisError::ValidationError(format!(
                "sentiment 必须是字符串，实际为 {}",
                json_type(&other)
            )))
        }
        None => {
            return Err(AnalysisError::ValidationError(
                "缺少 sentiment 字段".to_string(),
            ))
        }
    };

    Ok(AnalysisResult {
        sentiment,
        positive_keywords: string_list(&mut object, "positive_keywords"),
        negative_keywords: string_list(&mut object, "negative_keywords"),
        summary,
        mentioned_menu_items: string_list(&mut object, "mentioned_menu_items"),
        recommended_dishes: string_list(&mut object, "recommended_dishes"),
        average_rating,
        photo_urls: None,
    })
}

/// 取出字符串数组；缺失或不是数组时为空，非字符串元素丢弃
fn string_list(object: &mut Map<String, JsonValue>, key: &str) -> Vec<String> {
    match object.remove(key) {
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        Some(other) => {
            debug!("{} 不是数组 ({})，按空处理", key, json_type(&other));
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 整体情感倾向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Mixed,
        Sentiment::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// 忽略大小写和首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Sentiment::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == token)
            .ok_or_else(|| format!("未知的 sentiment: {:?}", s))
    }
}

/// 分析结果
///
/// 每个请求创建一次，交给调用方后即丢弃。字段名与对外 JSON 完全一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub summary: String,
    pub mentioned_menu_items: Vec<String>,
    pub recommended_dishes: Vec<String>,
    /// 由本次采集到的评论计算，从不采信模型给出的值
    pub average_rating: f64,
    #[serde(rename = "photoUrls", skip_serializing_if = "Option::is_none", default)]
    pub photo_urls: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse_is_lenient_on_case() {
        assert_eq!(" Positive ".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("MIXED".parse::<Sentiment>().unwrap(), Sentiment::Mixed);
        assert!("great".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_photo_urls_omitted_when_absent() {
        let result = AnalysisResult {
            sentiment: Sentiment::Neutral,
            positive_keywords: vec![],
            negative_keywords: vec![],
            summary: "ok".into(),
            mentioned_menu_items: vec![],
            recommended_dishes: vec![],
            average_rating: 3.0,
            photo_urls: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("photoUrls").is_none());
        assert_eq!(json["sentiment"], "neutral");

        let json = serde_json::to_value(AnalysisResult {
            photo_urls: Some(vec!["https://img".into()]),
            ..result
        })
        .unwrap();
        assert_eq!(json["photoUrls"][0], "https://img");
    }
}

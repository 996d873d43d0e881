use serde::{Deserialize, Serialize};

/// 一个待分析的目标页面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl Target {
    /// 解析命令行参数，格式为 `URL` 或 `URL#PLACE_ID`
    ///
    /// 只把最后一个 `#` 之后、且不含 `/ ? = ! &` 的部分视为地点 ID，真实的 URL 片段保持原样。
    pub fn parse_arg(arg: &str) -> Self {
        if let Some((url, place_id)) = arg.rsplit_once('#') {
            let looks_like_id = !place_id.is_empty()
                && !place_id.contains(|c: char| matches!(c, '/' | '?' | '=' | '!' | '&'));
            if looks_like_id {
                return Self {
                    url: url.to_string(),
                    place_id: Some(place_id.to_string()),
                };
            }
        }
        Self {
            url: arg.to_string(),
            place_id: None,
        }
    }
}

/// 目标列表文件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetList {
    #[serde(default, rename = "target")]
    pub targets: Vec<Target>,
}

use serde::{Deserialize, Serialize};

/// 单条评论记录
///
/// 只由采集层产生，创建后不再修改。`date` 保持页面原样（例如 "2 weeks ago"），不做归一化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub text: String,
    /// 0–5；页面上无法解析出整数时为 0
    pub rating: u8,
    pub date: String,
}

impl ReviewRecord {
    pub fn new(text: impl Into<String>, rating: u8, date: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: rating.min(5),
            date: date.into(),
        }
    }
}

/// 计算平均评分，保留一位小数；空输入为 0.0
///
/// 评分为 0 的记录（页面上没有可解析的星级）同样计入分母。
pub fn average_rating(reviews: &[ReviewRecord]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

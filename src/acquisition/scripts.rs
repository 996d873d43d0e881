//! 页面内执行的 JS
//!
//! 所有脚本都返回可序列化的值（不返回 `undefined`）。

use serde::Deserialize;

use crate::acquisition::selectors::SelectorContract;

/// 滚动到页面底部，返回当前文档高度
pub const SCROLL_TO_BOTTOM: &str =
    "(() => { window.scrollBy(0, document.body.scrollHeight); return document.body.scrollHeight; })()";

/// 页面脚本提取出的原始评论，评分仍是标签文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawReview {
    pub text: String,
    pub rating_label: String,
    pub date: String,
}

/// 按 DOM 顺序提取最多 `max_reviews` 条评论
pub fn extract_reviews(contract: &SelectorContract, max_reviews: usize) -> String {
    // serde_json 负责转义，选择器里的引号不会破坏脚本
    let quote = |s: &str| serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"
        (() => {{
            const elements = Array.from(document.querySelectorAll({container})).slice(0, {max});
            return elements.map((element) => {{
                const textElement = element.querySelector({text});
                const ratingElement = element.querySelector({rating});
                const dateElement = element.querySelector({date});
                return {{
                    text: (textElement && textElement.textContent) || "",
                    rating_label: (ratingElement && ratingElement.getAttribute({label_attr})) || "",
                    date: (dateElement && dateElement.textContent) || "",
                }};
            }});
        }})()
        "#,
        container = quote(contract.review_container),
        max = max_reviews,
        text = quote(contract.text),
        rating = quote(contract.rating),
        date = quote(contract.date),
        label_attr = quote(contract.rating_label_attr),
    )
}

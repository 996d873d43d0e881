//! 提示词构建 - 纯函数，无 I/O
//!
//! 指令文本是带版本号的常量，修改它需要同时提升 [`PROMPT_VERSION`]。

use crate::models::ReviewRecord;

pub const PROMPT_VERSION: &str = "review-analysis/v1";

const REVIEW_SEPARATOR: &str = "\n---\n";

const PREAMBLE: &str = "You are a JSON-only response bot. Analyze the following customer reviews \
of a restaurant and respond ONLY with a valid JSON object in the exact format specified below. \
Do not include any other text, explanations, or markdown formatting.";

const INSTRUCTIONS: &str = r#"Required JSON format (respond with ONLY this JSON structure):
{
  "sentiment": "positive" | "negative" | "mixed" | "neutral",
  "positive_keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
  "negative_keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
  "summary": "3-line summary of all reviews",
  "mentioned_menu_items": ["item1", "item2", "item3"],
  "recommended_dishes": ["dish1", "dish2", "dish3"]
}

Rules:
- "sentiment" must be exactly one of: "positive", "negative", "mixed", "neutral".
- "positive_keywords" and "negative_keywords" are arrays of at most 5 short strings each.
- "summary" is a single string and must not be empty.
- "mentioned_menu_items" and "recommended_dishes" are arrays of strings; use [] when none apply.
- Do not add any other fields."#;

/// 把评论渲染成给模型的指令
pub fn build_prompt(reviews: &[ReviewRecord]) -> String {
    let blocks = reviews
        .iter()
        .map(|review| format!("Rating: {}/5\nReview: {}\n", review.rating, review.text))
        .collect::<Vec<_>>()
        .join(REVIEW_SEPARATOR);

    format!("{PREAMBLE}\n\nReviews:\n{blocks}\n{INSTRUCTIONS}")
}

use std::sync::OnceLock;

use regex::Regex;

fn integer_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// 从无障碍标签（例如 "4 stars"、"별표 5개"）中取第一个整数作为评分
///
/// 没有整数时返回 0，不视为错误；大于 5 的值截断为 5。
pub fn parse_rating_label(label: &str) -> u8 {
    integer_token()
        .find(label)
        // 纯数字串解析失败只可能是溢出
        .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        .map(|n| n.min(5) as u8)
        .unwrap_or(0)
}

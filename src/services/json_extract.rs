//! 从模型原始输出中定位 JSON 对象
//!
//! 模型经常在 JSON 前后附带说明文字或 markdown 代码块，这里用括号匹配扫描找出
//! 第一个括号平衡的 `{...}` 片段。字符串字面量中的括号不参与计数。

/// 返回第一个括号平衡的对象片段；找不到时返回 `None`
///
/// 只做括号匹配，不保证片段本身是合法 JSON，解析交给调用方。
pub fn find_json_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|len| &text[start..start + len]))
}

/// `s` 以 `{` 开头，返回与之匹配的 `}` 之后的字节偏移
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

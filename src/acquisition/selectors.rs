/// 页面结构约定
///
/// 第三方页面的标记没有稳定性保证，这里的选择器是带版本号的约定。
/// 选择器失效是声明过的失败模式（`SelectorNotFound`），采集层不尝试自愈。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorContract {
    pub version: &'static str,
    /// 单条评论的容器，同时用作"评论区已出现"的信号
    pub review_container: &'static str,
    pub text: &'static str,
    pub rating: &'static str,
    /// 星级元素上携带评分文本的属性
    pub rating_label_attr: &'static str,
    pub date: &'static str,
}

impl SelectorContract {
    pub const GOOGLE_MAPS_V1: SelectorContract = SelectorContract {
        version: "google-maps/v1",
        review_container: "div.jJc9Ad",
        text: "span.wiI7pd",
        rating: r#"span.kvMYJc[role="img"]"#,
        rating_label_attr: "aria-label",
        date: "span.rsqaWe",
    };
}

impl Default for SelectorContract {
    fn default() -> Self {
        Self::GOOGLE_MAPS_V1
    }
}

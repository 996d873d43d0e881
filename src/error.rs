//! 错误类型
//!
//! 两级错误分类：
//! - 采集层（`AcquisitionError`）：浏览器启动、导航、选择器、兜底故障
//! - 分析层（`AnalysisError`）：模型调用、响应格式、结构校验
//!
//! 对外边界只暴露 `Display` 文本，不暴露内部结构。

use std::time::Duration;

use thiserror::Error;

/// 浏览器会话能力返回的错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 操作在截止时间内未完成
    #[error("操作超时 ({0:?})")]
    Timeout(Duration),
    /// 浏览器报告导航失败（例如网络错误）
    #[error("导航失败: {0}")]
    Navigation(String),
    /// 协议 / 脚本执行等其他错误
    #[error(transparent)]
    Protocol(#[from] anyhow::Error),
}

impl From<chromiumoxide::error::CdpError> for SessionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SessionError::Protocol(anyhow::anyhow!("CDP 错误: {}", err))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Protocol(err.into())
    }
}

/// 采集层错误
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// 无法启动浏览器会话
    #[error("无法启动浏览器会话: {0}")]
    LaunchError(#[source] anyhow::Error),

    /// 会话池已满，等待超时
    #[error("浏览器会话池已满 (容量 {capacity})，等待 {waited:?} 后仍无空位")]
    PoolExhausted { capacity: usize, waited: Duration },

    /// 页面导航超时
    #[error("页面导航超时 ({deadline:?}): {url}")]
    NavigationTimeout { url: String, deadline: Duration },

    /// 评论区选择器未出现，通常意味着页面结构已变化
    #[error("未找到评论区 (选择器 {selector}, 等待 {deadline:?})，页面结构可能已变化")]
    SelectorNotFound { selector: String, deadline: Duration },

    /// 其他未分类的故障
    #[error("采集评论失败: {0}")]
    UnexpectedFault(#[source] anyhow::Error),

    /// 采集成功但没有任何评论
    #[error("页面上没有找到任何评论")]
    NoReviewsFound,
}

/// 分析层错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 模型调用本身失败（网络、鉴权、配额、超时）
    #[error("模型调用失败: {0}")]
    ModelCallError(#[source] anyhow::Error),

    /// 模型响应中找不到可解析的 JSON 对象
    #[error("模型响应格式错误: {0}")]
    MalformedModelResponse(String),

    /// JSON 可解析但不符合结构要求
    #[error("模型响应校验失败: {0}")]
    ValidationError(String),
}

/// 单次请求的流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量存在但无法解析
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl AcquisitionError {
    /// 错误类别名，用于统计
    pub fn kind(&self) -> &'static str {
        match self {
            AcquisitionError::LaunchError(_) => "LaunchError",
            AcquisitionError::PoolExhausted { .. } => "PoolExhausted",
            AcquisitionError::NavigationTimeout { .. } => "NavigationTimeout",
            AcquisitionError::SelectorNotFound { .. } => "SelectorNotFound",
            AcquisitionError::UnexpectedFault(_) => "UnexpectedFault",
            AcquisitionError::NoReviewsFound => "NoReviewsFound",
        }
    }
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ModelCallError(_) => "ModelCallError",
            AnalysisError::MalformedModelResponse(_) => "MalformedModelResponse",
            AnalysisError::ValidationError(_) => "ValidationError",
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Acquisition(e) => e.kind(),
            PipelineError::Analysis(e) => e.kind(),
        }
    }
}

/// 流水线结果类型
pub type Result<T> = std::result::Result<T, PipelineError>;

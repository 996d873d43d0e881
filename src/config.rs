use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 浏览器 ---
    /// 浏览器可执行文件路径（为空时由 chromiumoxide 自动探测）
    pub browser_executable: Option<String>,
    /// 是否使用无头模式
    pub headless: bool,
    /// 导航截止时间（秒）
    pub navigation_timeout_secs: u64,
    /// 等待评论区出现的截止时间（秒）
    pub selector_timeout_secs: u64,
    /// 滚动加载的次数
    pub scroll_rounds: usize,
    /// 每次滚动后的等待时间（毫秒）
    pub scroll_settle_ms: u64,
    /// 最多提取的评论数，只能调低，上限见 [`MAX_REVIEWS_CAP`](crate::acquisition::MAX_REVIEWS_CAP)
    pub max_reviews: usize,
    /// 同时存活的浏览器会话上限
    pub max_browser_sessions: usize,
    /// 会话池满时最多等待多久（秒），0 表示立即拒绝
    pub session_acquire_timeout_secs: u64,

    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 模型调用截止时间（秒）
    pub llm_timeout_secs: u64,

    // --- 地点照片 ---
    /// Places API 密钥，为空时跳过照片补充
    pub places_api_key: Option<String>,
    pub places_api_base_url: String,
    pub photo_max_width: u32,

    // --- 输出 ---
    /// 批量运行结果日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_executable: None,
            headless: true,
            navigation_timeout_secs: 120,
            selector_timeout_secs: 60,
            scroll_rounds: 3,
            scroll_settle_ms: 5000,
            max_reviews: 20,
            max_browser_sessions: 4,
            session_acquire_timeout_secs: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            llm_timeout_secs: 60,
            places_api_key: None,
            places_api_base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            photo_max_width: 800,
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 以默认值为基础，用环境变量覆盖
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载（缺省字段取默认值），环境变量仍然优先
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        config.with_env_overrides()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            browser_executable: env_string("BROWSER_EXECUTABLE").or(self.browser_executable),
            headless: env_parse("HEADLESS", "bool")?.unwrap_or(self.headless),
            navigation_timeout_secs: env_parse("NAVIGATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.navigation_timeout_secs),
            selector_timeout_secs: env_parse("SELECTOR_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.selector_timeout_secs),
            scroll_rounds: env_parse("SCROLL_ROUNDS", "usize")?.unwrap_or(self.scroll_rounds),
            scroll_settle_ms: env_parse("SCROLL_SETTLE_MS", "u64")?.unwrap_or(self.scroll_settle_ms),
            max_reviews: env_parse("MAX_REVIEWS", "usize")?.unwrap_or(self.max_reviews),
            max_browser_sessions: env_parse("MAX_BROWSER_SESSIONS", "usize")?
                .unwrap_or(self.max_browser_sessions),
            session_acquire_timeout_secs: env_parse("SESSION_ACQUIRE_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.session_acquire_timeout_secs),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", "u64")?.unwrap_or(self.llm_timeout_secs),
            places_api_key: env_string("PLACES_API_KEY").or(self.places_api_key),
            places_api_base_url: env_string("PLACES_API_BASE_URL")
                .unwrap_or(self.places_api_base_url),
            photo_max_width: env_parse("PHOTO_MAX_WIDTH", "u32")?.unwrap_or(self.photo_max_width),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn session_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.session_acquire_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

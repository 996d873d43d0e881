//! 日志工具模块
//!
//! 提供订阅器初始化、日志文件和格式化输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化结果日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n评论分析日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 评论采集与分析");
    info!("🌐 最大浏览器会话数: {}", config.max_browser_sessions);
    info!("🤖 模型: {}", config.llm_model_name);
    info!(
        "🖼️ 照片补充: {}",
        if config.places_api_key.is_some() { "开启" } else { "关闭" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录目标加载信息
pub fn log_targets_loaded(total: usize, max_sessions: usize) {
    info!("✓ 共 {} 个待分析的目标", total);
    info!("📋 最多同时运行 {} 个浏览器会话\n", max_sessions);
}

/// 打印最终统计信息，失败目标按错误类别分组
pub fn print_final_stats(stats: &RunStats, log_file_path: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "📊 评论分析完成 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    if stats.failed > 0 {
        info!("❌ 失败: {}", stats.failed);
        for (kind, count) in &stats.failures {
            info!("   - {}: {}", kind, count);
        }
    }
    info!("📝 结果已保存至: {}", log_file_path);
    info!("{}", "=".repeat(60));
}

/// 把评论 / 模型输出压成一行并截断到 `max_chars` 个字符，用于日志显示
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let mut flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some((cut, _)) = flattened.char_indices().nth(max_chars) {
        flattened.truncate(cut);
        flattened.push('…');
    }
    flattened
}

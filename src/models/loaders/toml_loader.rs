use crate::models::target::{Target, TargetList};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载目标列表
///
/// 文件格式：
/// ```toml
/// [[target]]
/// url = "https://www.google.com/maps/place/..."
/// place_id = "ChIJ..."
/// ```
pub async fn load_targets(toml_file_path: &Path) -> Result<Vec<Target>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let list = parse_targets(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "从 {} 加载了 {} 个目标",
        toml_file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        list.len()
    );

    Ok(list)
}

fn parse_targets(content: &str) -> Result<Vec<Target>> {
    let list: TargetList = toml::from_str(content)?;

    let (valid, skipped): (Vec<_>, Vec<_>) = list
        .targets
        .into_iter()
        .partition(|t| !t.url.trim().is_empty());
    if !skipped.is_empty() {
        tracing::warn!("跳过 {} 个 url 为空的目标", skipped.len());
    }

    Ok(valid)
}

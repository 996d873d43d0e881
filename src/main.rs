//! `review_insight` - 采集评论页面并输出分析报告
//!
//! ```text
//! review_insight [--config config.toml] [--targets targets.toml] [URL[#PLACE_ID]]...
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use review_insight::models::{load_targets, Target};
use review_insight::utils::logging;
use review_insight::{App, Config};

/// 餐厅评论采集与分析
#[derive(Parser)]
#[command(name = "review_insight", about = "Scrape restaurant reviews and summarize them", version)]
struct Cli {
    /// TOML 配置文件（环境变量优先于文件）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 目标列表文件，包含若干 [[target]] 条目
    #[arg(short, long)]
    targets: Option<PathBuf>,

    /// 显示 debug 日志
    #[arg(short, long)]
    verbose: bool,

    /// 评论页面地址，可用 `URL#PLACE_ID` 附带地点 ID
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env()?,
    };

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    let mut targets: Vec<Target> = cli.urls.iter().map(|arg| Target::parse_arg(arg)).collect();
    if let Some(path) = &cli.targets {
        targets.extend(load_targets(path).await?);
    }

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.run(targets).await?;

    Ok(())
}

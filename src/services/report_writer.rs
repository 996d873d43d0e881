//! 结果写入服务 - 业务能力层
//!
//! 只负责"把一条结果追加到日志文件"，不关心流程

use anyhow::Result;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::{AnalysisResult, Target};
use crate::workflow::ApiResponse;

/// 结果写入服务，每个目标一行 JSON
pub struct ReportWriter {
    log_file_path: String,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    url: &'a str,
    #[serde(rename = "placeId", skip_serializing_if = "Option::is_none")]
    place_id: Option<&'a str>,
    response: &'a ApiResponse<AnalysisResult>,
}

impl ReportWriter {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.log_file_path
    }

    /// 追加一条结果
    pub fn write(&self, target: &Target, response: &ApiResponse<AnalysisResult>) -> Result<()> {
        debug!("写入结果: {} (success={})", target.url, response.success);

        let line = serde_json::to_string(&ReportLine {
            url: &target.url,
            place_id: target.place_id.as_deref(),
            response,
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }
}

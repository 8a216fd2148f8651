//! 职位描述导入服务 - 业务能力层
//!
//! 两种来源：
//! - 后端抓取：走 `job_import` 工作流
//! - 浏览器页面：连接调试端口（失败时启动无头浏览器），在页面上跑提取启发式

use tracing::{debug, info, warn};

use crate::browser::{connect_to_job_page, launch_headless_browser};
use crate::config::Config;
use crate::error::{AppResult, ExtractionError};
use crate::extraction::{extract_from_page, ContentExtractionHeuristic, Extraction};
use crate::infrastructure::JsExecutor;
use crate::models::WorkflowInput;
use crate::pipeline::PipelineController;
use crate::utils::truncate_text;
use crate::workflow::{execute, normalize_job_url, ImportedJob, WorkflowKind};

/// 导入方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportMode {
    Backend,
    Browser {
        debug_port: u16,
        chrome_executable: Option<String>,
    },
}

/// 职位描述导入服务
pub struct JobImporter {
    mode: ImportMode,
    heuristic: ContentExtractionHeuristic,
}

impl JobImporter {
    pub fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            heuristic: ContentExtractionHeuristic::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mode = if config.import_via_browser {
            ImportMode::Browser {
                debug_port: config.browser_debug_port,
                chrome_executable: config.chrome_executable.clone(),
            }
        } else {
            ImportMode::Backend
        };
        Self::new(mode)
    }

    pub fn mode(&self) -> &ImportMode {
        &self.mode
    }

    /// 导入职位描述，返回纯文本
    pub async fn import(&self, controller: &PipelineController, source_url: &str) -> AppResult<String> {
        info!("📥 导入职位描述: {}", source_url);

        let description = match &self.mode {
            ImportMode::Backend => {
                let input = WorkflowInput {
                    source_url: source_url.to_string(),
                    ..Default::default()
                };
                let imported: ImportedJob = execute(controller, WorkflowKind::JobImport, input).await?;
                imported.description
            }
            ImportMode::Browser {
                debug_port,
                chrome_executable,
            } => {
                self.import_from_browser(source_url, *debug_port, chrome_executable.as_deref())
                    .await?
            }
        };

        info!(
            "✓ 已导入职位描述 ({} 字符): {}",
            description.chars().count(),
            truncate_text(&description, 60)
        );
        Ok(description)
    }

    async fn import_from_browser(
        &self,
        source_url: &str,
        debug_port: u16,
        chrome_executable: Option<&str>,
    ) -> AppResult<String> {
        let url = normalize_job_url(source_url)?;

        let (_browser, page) = match connect_to_job_page(debug_port, Some(&url)).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("⚠️  无法连接调试端口 {}，改用无头浏览器: {}", debug_port, e);
                launch_headless_browser(&url, chrome_executable).await?
            }
        };

        let executor = JsExecutor::new(page);
        if let Err(e) = executor.page().wait_for_navigation().await {
            debug!("等待页面加载失败，继续提取: {}", e);
        }

        match extract_from_page(&executor, &self.heuristic).await {
            Extraction::Found { text, selector } => {
                debug!("命中选择器: {}", selector);
                Ok(text)
            }
            Extraction::NotFound => Err(ExtractionError::NotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::error::AppError;
    use crate::pipeline::{ScriptedExecutor, StageKind};

    #[test]
    fn test_mode_follows_config() {
        let mut config = Config::default();
        assert_eq!(JobImporter::from_config(&config).mode(), &ImportMode::Backend);

        config.import_via_browser = true;
        assert_eq!(
            JobImporter::from_config(&config).mode(),
            &ImportMode::Browser {
                debug_port: 9222,
                chrome_executable: None
            }
        );
    }

    #[tokio::test]
    async fn test_backend_import_sends_normalized_url() {
        let executor = Arc::new(
            ScriptedExecutor::new()
                .succeed(StageKind::ScrapeJob, json!({ "description": "  Build payment rails in Rust.  " })),
        );
        let controller = PipelineController::new(executor.clone());

        let description = JobImporter::new(ImportMode::Backend)
            .import(&controller, "https://www.linkedin.com/jobs/search/?currentJobId=77")
            .await
            .unwrap();

        assert_eq!(description, "Build payment rails in Rust.");
        assert_eq!(
            executor.request_for(StageKind::ScrapeJob).unwrap()["url"],
            "https://www.linkedin.com/jobs/view/77"
        );
    }

    #[tokio::test]
    async fn test_backend_failure_reason_passes_through() {
        let executor = Arc::new(
            ScriptedExecutor::new().fail(StageKind::ScrapeJob, "Scraper blocked or failed (Status 999)"),
        );
        let controller = PipelineController::new(executor);

        let err = JobImporter::new(ImportMode::Backend)
            .import(&controller, "https://example.com/jobs/1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Stage { ref reason, .. } if reason == "Scraper blocked or failed (Status 999)"
        ));
    }

    #[tokio::test]
    #[ignore] // 需要本地 Chrome
    async fn test_browser_import() {
        let importer = JobImporter::new(ImportMode::Browser {
            debug_port: 9222,
            chrome_executable: None,
        });
        let controller = PipelineController::new(Arc::new(ScriptedExecutor::new()));
        let result = importer
            .import(&controller, "https://www.rust-lang.org/")
            .await;
        assert!(result.is_ok() || matches!(result, Err(AppError::Extraction(_))));
    }
}

/// HTTP 阶段执行器
///
/// 每个阶段对应后端的一个 POST 接口，请求体即阶段构造出的 JSON
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::clients::response::normalize;
use crate::config::Config;
use crate::error::AppResult;
use crate::pipeline::executor::StageExecutor;
use crate::pipeline::stage::{FailureKind, StageFailure, StageKind, StageResult};

/// HTTP 阶段执行器
pub struct HttpStageExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStageExecutor {
    /// 使用配置中的地址和超时创建
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    /// 复用已有的 reqwest 客户端
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, stage: StageKind) -> String {
        format!("{}{}", self.base_url, stage.path())
    }
}

#[async_trait]
impl StageExecutor for HttpStageExecutor {
    async fn execute(&self, stage: StageKind, request: JsonValue) -> StageResult<JsonValue> {
        let url = self.url_for(stage);
        debug!("POST {}", url);

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("阶段 {} 请求失败: {}", stage, e);
                return StageResult::Failure(StageFailure::new(
                    stage,
                    FailureKind::Transport,
                    format!("{}: {}", stage.generic_failure(), e),
                ));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("阶段 {} 读取响应失败: {}", stage, e);
                return StageResult::Failure(StageFailure::new(
                    stage,
                    FailureKind::Transport,
                    format!("{}: {}", stage.generic_failure(), e),
                ));
            }
        };
        debug!("阶段 {} 响应: HTTP {} ({} 字节)", stage, status, body.len());

        normalize(stage.generic_failure(), status, &body)
            .map_err(|e| StageFailure::new(stage, e.kind, e.reason))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let executor = HttpStageExecutor::with_client(reqwest::Client::new(), "http://localhost:8000/");
        assert_eq!(executor.url_for(StageKind::Rewrite), "http://localhost:8000/rewrite");
        assert_eq!(executor.url_for(StageKind::ScrapeJob), "http://localhost:8000/scrape-job");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        // 端口 9 (discard) 在测试环境中不会有 HTTP 服务
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let executor = HttpStageExecutor::with_client(client, "http://127.0.0.1:9");
        let result = executor
            .execute(StageKind::DetectAi, serde_json::json!({ "resume_yaml": "cv: {}" }))
            .await;

        match result {
            StageResult::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::Transport);
                assert!(failure.reason.starts_with("Failed to analyze AI patterns."));
            }
            StageResult::Success(_) => panic!("expected transport failure"),
        }
    }
}

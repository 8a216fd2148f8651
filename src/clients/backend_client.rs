/// 后端存储客户端
///
/// 封装版本管理和投递记录接口（非流水线阶段），与阶段调用共用响应判定
use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::clients::response::normalize;
use crate::config::Config;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{sanitize_version_name, ApplicationRecord, ApplicationStatus, ResumeVersion};

/// 后端存储客户端
#[derive(Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(client, &config.api_base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|_| ValidationError::InvalidFormat {
            field: "api_base_url",
            value: base_url.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidFormat {
                field: "api_base_url",
                value: base_url.to_string(),
            }
            .into());
        }
        Ok(Self { client, base_url })
    }

    /// 拼接路径段（自动转义版本名中的空格等字符）
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ========== 版本管理 ==========

    /// 列出已保存的版本名
    pub async fn list_versions(&self) -> AppResult<Vec<String>> {
        self.request(Method::GET, &["versions"], None, "Failed to list versions")
            .await
    }

    pub async fn get_version(&self, name: &str) -> AppResult<ResumeVersion> {
        self.request(Method::GET, &["versions", name], None, "Version not found")
            .await
    }

    /// 保存版本，返回清洗后实际使用的名字
    pub async fn save_version(&self, name: &str, yaml_content: &str, theme: &str) -> AppResult<String> {
        let safe_name = sanitize_version_name(name)?;
        let body = json!({
            "name": safe_name,
            "yaml_content": yaml_content,
            "theme": theme,
        });

        let saved: JsonValue = self
            .request(Method::POST, &["versions"], Some(body), "Failed to save version")
            .await?;
        let stored_name = saved
            .get("name")
            .and_then(JsonValue::as_str)
            .unwrap_or(&safe_name)
            .to_string();

        info!("💾 已保存简历版本: {}", stored_name);
        Ok(stored_name)
    }

    pub async fn delete_version(&self, name: &str) -> AppResult<()> {
        let _: JsonValue = self
            .request(Method::DELETE, &["versions", name], None, "Failed to delete version")
            .await?;
        Ok(())
    }

    // ========== 投递记录 ==========

    pub async fn list_applications(&self) -> AppResult<Vec<ApplicationRecord>> {
        self.request(Method::GET, &["applications"], None, "Failed to load applications")
            .await
    }

    /// 新建投递记录，返回带 id 的记录
    pub async fn create_application(&self, record: &ApplicationRecord) -> AppResult<ApplicationRecord> {
        record.validate()?;
        let body = serde_json::to_value(record)?;
        let created: ApplicationRecord = self
            .request(Method::POST, &["applications"], Some(body), "Failed to create application")
            .await?;
        info!(
            "📌 已记录投递: {} - {} ({})",
            created.company_name,
            created.job_title,
            created.id.as_deref().unwrap_or("-")
        );
        Ok(created)
    }

    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> AppResult<ApplicationRecord> {
        self.request(
            Method::PATCH,
            &["applications", id],
            Some(json!({ "status": status.as_str() })),
            "Application not found",
        )
        .await
    }

    pub async fn delete_application(&self, id: &str) -> AppResult<()> {
        let _: JsonValue = self
            .request(Method::DELETE, &["applications", id], None, "Failed to delete application")
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<JsonValue>,
        generic: &str,
    ) -> AppResult<T> {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", generic, e)))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Storage(format!("{}: {}", generic, e)))?;

        let value = normalize(generic, status, &text).map_err(|e| AppError::Storage(e.reason))?;
        serde_json::from_value(value).map_err(|e| AppError::Storage(format!("{}: {}", generic, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        BackendClient::with_client(reqwest::Client::new(), "http://localhost:8000").unwrap()
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = client().endpoint(&["versions", "Acme Backend v2"]);
        assert_eq!(url.as_str(), "http://localhost:8000/versions/Acme%20Backend%20v2");

        let nested = BackendClient::with_client(reqwest::Client::new(), "http://host/api/").unwrap();
        assert_eq!(
            nested.endpoint(&["applications", "ab12cd34"]).as_str(),
            "http://host/api/applications/ab12cd34"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = BackendClient::with_client(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_version_validates_before_request() {
        let err = client().save_version("///", "cv: {}", "classic").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::InvalidVersionName { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_application_validates_before_request() {
        let record = ApplicationRecord::new("", "Engineer", "JD");
        let err = client().create_application(&record).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

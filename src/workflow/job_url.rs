//! 职位链接规范化

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::error::ValidationError;

/// LinkedIn 公开职位页
const LINKEDIN_VIEW_PREFIX: &str = "https://www.linkedin.com/jobs/view/";

/// 职位 ID 的提取规则：查询参数优先，其次是路径
static JOB_ID_PATTERNS: LazyLock<Result<[Regex; 2], regex::Error>> =
    LazyLock::new(|| Ok([Regex::new(r"currentJobId=(\d+)")?, Regex::new(r"jobs/view/(\d+)")?]));

/// 规范化导入链接
///
/// LinkedIn 的搜索 / 推荐列表页带着 `currentJobId=<id>`，或路径里有 `jobs/view/<id>`，
/// 统一改写成公开的职位详情页；其他站点原样返回
pub fn normalize_job_url(raw: &str) -> Result<String, ValidationError> {
    let url = raw.trim();
    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidFormat {
        field: "source_url",
        value: url.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidFormat {
            field: "source_url",
            value: url.to_string(),
        });
    }

    if !url.contains("linkedin.com") {
        return Ok(url.to_string());
    }

    match linkedin_job_id(url) {
        Some(job_id) => {
            let rewritten = format!("{}{}", LINKEDIN_VIEW_PREFIX, job_id);
            tracing::debug!("LinkedIn 链接改写: {} -> {}", url, rewritten);
            Ok(rewritten)
        }
        None => Ok(url.to_string()),
    }
}

fn linkedin_job_id(url: &str) -> Option<String> {
    match JOB_ID_PATTERNS.as_ref() {
        Ok(patterns) => patterns
            .iter()
            .find_map(|re| re.captures(url).map(|caps| caps[1].to_string())),
        Err(e) => {
            tracing::warn!("⚠️ LinkedIn 职位 ID 规则无法编译，链接保持原样: {}", e);
            None
        }
    }
}

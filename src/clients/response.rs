//! 响应归一化
//!
//! 所有后端调用共用一套判定：状态码 → 响应体解析 → 服务端错误字段

use serde_json::Value as JsonValue;

use crate::pipeline::stage::FailureKind;

/// 归一化后的失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub kind: FailureKind,
    pub reason: String,
}

impl ResponseError {
    fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// 判定一次响应
///
/// - 非 2xx：优先用 `detail` 原文，否则通用描述加状态码
/// - 2xx 但无法解析：通用描述
/// - 2xx 且带 `detail` / `error` 字段：服务端报错，原文透传
pub fn normalize(generic: &str, status: u16, body: &str) -> Result<JsonValue, ResponseError> {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    let success = (200..300).contains(&status);

    if !success {
        let reason = parsed
            .as_ref()
            .and_then(reported_error)
            .unwrap_or_else(|| format!("{} (HTTP {})", generic, status));
        return Err(ResponseError::new(FailureKind::Status, reason));
    }

    let Some(value) = parsed else {
        return Err(ResponseError::new(FailureKind::Malformed, generic));
    };

    if let Some(reason) = reported_error(&value) {
        return Err(ResponseError::new(FailureKind::Reported, reason));
    }

    Ok(value)
}

/// 提取服务端报告的错误信息
///
/// `detail` 可能是字符串，也可能是校验错误列表（此时输出 JSON 文本）
pub fn reported_error(value: &JsonValue) -> Option<String> {
    ["detail", "error"].iter().find_map(|field| match value.get(field) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(message)) if message.trim().is_empty() => None,
        Some(JsonValue::String(message)) => Some(message.clone()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_body_passes_through() {
        let value = normalize("Render failed", 200, r#"{"pdf_base64":"JVBERg=="}"#).unwrap();
        assert_eq!(value, json!({ "pdf_base64": "JVBERg==" }));
    }

    #[test]
    fn test_error_status_uses_detail_verbatim() {
        let err = normalize(
            "Render failed",
            500,
            r#"{"detail":"RenderCV generation failed. Logs: ..."}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::Status);
        assert_eq!(err.reason, "RenderCV generation failed. Logs: ...");
    }

    #[test]
    fn test_error_status_without_detail_is_generic() {
        let err = normalize("Failed to scrape URL", 502, "<html>Bad gateway</html>").unwrap_err();
        assert_eq!(err.reason, "Failed to scrape URL (HTTP 502)");
    }

    #[test]
    fn test_unparsable_success_body_is_malformed() {
        let err = normalize("AI rewrite failed", 200, "not json").unwrap_err();
        assert_eq!(err.kind, FailureKind::Malformed);
        assert_eq!(err.reason, "AI rewrite failed");
    }

    #[test]
    fn test_error_field_on_success_is_reported() {
        let err = normalize("x", 200, r#"{"error":"quota exceeded"}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::Reported);
        assert_eq!(err.reason, "quota exceeded");

        // 校验错误列表
        let err = normalize("x", 422, r#"{"detail":[{"loc":["body","url"],"msg":"field required"}]}"#)
            .unwrap_err();
        assert!(err.reason.contains("field required"));

        // null 字段不算错误
        assert!(normalize("x", 200, r#"{"detail":null,"yaml":"cv: {}"}"#).is_ok());
    }
}

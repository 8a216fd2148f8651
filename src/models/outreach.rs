//! 外联消息结果
//!
//! 后端可能返回单条 `content`，也可能返回 `emails` 序列，这里解析成带标签的枚举

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 序列中的一封邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachEmail {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub subject: String,
    pub body: String,
}

/// 外联结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutreachResult {
    Single(String),
    Sequence(Vec<OutreachEmail>),
}

impl OutreachResult {
    /// 优先识别非空的 `emails` 列表，其次是 `content` 字符串
    pub fn from_payload(payload: &JsonValue) -> Result<Self, String> {
        if let Some(emails) = payload.get("emails").filter(|v| !v.is_null()) {
            let emails: Vec<OutreachEmail> = serde_json::from_value(emails.clone())
                .map_err(|e| format!("invalid \"emails\" list: {}", e))?;
            if !emails.is_empty() {
                return Ok(OutreachResult::Sequence(emails));
            }
        }

        payload
            .get("content")
            .and_then(JsonValue::as_str)
            .map(|content| OutreachResult::Single(content.to_string()))
            .ok_or_else(|| "response has neither \"emails\" nor \"content\"".to_string())
    }

    pub fn len(&self) -> usize {
        match self {
            OutreachResult::Single(_) => 1,
            OutreachResult::Sequence(emails) => emails.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 调用方看到的外联消息：序列时可按下标切换，单条时没有选择
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachVariants {
    result: OutreachResult,
    selected: Option<usize>,
}

impl OutreachVariants {
    pub fn new(result: OutreachResult) -> Self {
        let selected = match &result {
            OutreachResult::Sequence(emails) if !emails.is_empty() => Some(0),
            _ => None,
        };
        Self { result, selected }
    }

    pub fn result(&self) -> &OutreachResult {
        &self.result
    }

    /// 可选的变体数量；单条消息为 0（不需要选择）
    pub fn variant_count(&self) -> usize {
        match &self.result {
            OutreachResult::Single(_) => 0,
            OutreachResult::Sequence(emails) => emails.len(),
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// 切换选中项，越界时返回 false 且保持不变
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.variant_count() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn selected_email(&self) -> Option<&OutreachEmail> {
        match (&self.result, self.selected) {
            (OutreachResult::Sequence(emails), Some(index)) => emails.get(index),
            _ => None,
        }
    }

    /// 当前显示的正文
    pub fn active_text(&self) -> &str {
        match &self.result {
            OutreachResult::Single(text) => text,
            OutreachResult::Sequence(_) => self
                .selected_email()
                .map(|email| email.body.as_str())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_defaults_to_first_variant() {
        let payload = json!({
            "emails": [
                { "label": "Initial Email", "subject": "Hello", "body": "first" },
                { "label": "Follow-up (3 Days)", "subject": "Re: Hello", "body": "second" },
                { "label": "Final Follow-up (7 Days)", "subject": "Re: Hello", "body": "third" }
            ]
        });

        let mut variants = OutreachVariants::new(OutreachResult::from_payload(&payload).unwrap());
        assert_eq!(variants.variant_count(), 3);
        assert_eq!(variants.selected_index(), Some(0));
        assert_eq!(variants.active_text(), "first");

        assert!(variants.select(2));
        assert_eq!(variants.selected_email().unwrap().label, "Final Follow-up (7 Days)");
        assert!(!variants.select(3));
        assert_eq!(variants.selected_index(), Some(2));
    }

    #[test]
    fn test_single_content_has_no_selection() {
        let payload = json!({ "content": "Hi Jane, I'd love to connect." });
        let mut variants = OutreachVariants::new(OutreachResult::from_payload(&payload).unwrap());

        assert_eq!(variants.variant_count(), 0);
        assert_eq!(variants.selected_index(), None);
        assert_eq!(variants.active_text(), "Hi Jane, I'd love to connect.");
        assert!(!variants.select(0));
    }

    #[test]
    fn test_unrecognized_payload_is_rejected() {
        assert!(OutreachResult::from_payload(&json!({ "message": "x" })).is_err());
        assert!(OutreachResult::from_payload(&json!({ "emails": "nope" })).is_err());
        // 空列表退回 content
        assert_eq!(
            OutreachResult::from_payload(&json!({ "emails": [], "content": "x" })).unwrap(),
            OutreachResult::Single("x".to_string())
        );
    }
}

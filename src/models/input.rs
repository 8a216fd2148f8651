//! 工作流输入

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 外联消息类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachType {
    #[default]
    Linkedin,
    ColdEmail,
    FollowUp,
}

impl OutreachType {
    pub fn tag(&self) -> &'static str {
        match self {
            OutreachType::Linkedin => "linkedin",
            OutreachType::ColdEmail => "cold_email",
            OutreachType::FollowUp => "follow_up",
        }
    }
}

/// LinkedIn 消息格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    /// 好友申请（300 字符以内）
    #[default]
    Connection,
    /// 完整私信
    Message,
}

impl MessageFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            MessageFormat::Connection => "connection",
            MessageFormat::Message => "message",
        }
    }
}

/// 必填校验用的字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    JobDescription,
    Resume,
    SourceUrl,
}

impl InputField {
    pub fn name(&self) -> &'static str {
        match self {
            InputField::JobDescription => "job_description",
            InputField::Resume => "resume_yaml",
            InputField::SourceUrl => "source_url",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次用户操作的全部输入
///
/// 各阶段的请求构造函数从这里取字段
#[derive(Debug, Clone, Default)]
pub struct WorkflowInput {
    pub job_description: String,
    /// 当前简历（RenderCV YAML）
    pub resume_yaml: String,
    /// AI 服务凭证，为空时由后端自行决定
    pub api_key: Option<String>,
    pub target_region: String,
    /// 用户给改写的额外说明
    pub instructions: String,
    pub model_version: String,
    pub theme: String,
    pub outreach_type: OutreachType,
    pub recruiter_name: String,
    pub recruiter_role: String,
    pub company_name: String,
    pub message_format: MessageFormat,
    /// 导入职位描述时的来源链接
    pub source_url: String,
}

impl WorkflowInput {
    fn value_of(&self, field: InputField) -> &str {
        match field {
            InputField::JobDescription => &self.job_description,
            InputField::Resume => &self.resume_yaml,
            InputField::SourceUrl => &self.source_url,
        }
    }

    /// 检查必填字段，返回第一个缺失的
    pub fn require(&self, fields: &[InputField]) -> Result<(), ValidationError> {
        match fields
            .iter()
            .find(|field| self.value_of(**field).trim().is_empty())
        {
            Some(field) => Err(ValidationError::MissingField {
                field: field.name(),
            }),
            None => Ok(()),
        }
    }

    /// 主题，未设置时为 classic
    pub fn theme_or_default(&self) -> &str {
        if self.theme.trim().is_empty() {
            "classic"
        } else {
            &self.theme
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_first_missing_field() {
        let input = WorkflowInput {
            job_description: "  ".to_string(),
            resume_yaml: String::new(),
            ..Default::default()
        };

        assert_eq!(
            input.require(&[InputField::JobDescription, InputField::Resume]),
            Err(ValidationError::MissingField {
                field: "job_description"
            })
        );

        let input = WorkflowInput {
            job_description: "Backend engineer".to_string(),
            resume_yaml: "cv:\n  name: A".to_string(),
            ..Default::default()
        };
        assert!(input
            .require(&[InputField::JobDescription, InputField::Resume])
            .is_ok());
    }

    #[test]
    fn test_tags_match_backend_values() {
        assert_eq!(OutreachType::ColdEmail.tag(), "cold_email");
        assert_eq!(MessageFormat::Message.tag(), "message");
        assert_eq!(WorkflowInput::default().theme_or_default(), "classic");
    }
}

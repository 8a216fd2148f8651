//! 投递记录与简历版本

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::truncate_text;

/// 投递记录中职位描述保留的最大字符数
pub const TRACKED_DESCRIPTION_CHARS: usize = 200;

/// 投递状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interviewing,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(ValidationError::InvalidFormat {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// 后端保存的投递记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub company_name: String,
    pub job_title: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub date_applied: String,
    #[serde(default)]
    pub job_description: String,
}

impl ApplicationRecord {
    /// 新建记录：日期默认今天，职位描述截断
    pub fn new(
        company_name: impl Into<String>,
        job_title: impl Into<String>,
        job_description: &str,
    ) -> Self {
        Self {
            id: None,
            company_name: company_name.into(),
            job_title: job_title.into(),
            status: ApplicationStatus::Applied,
            date_applied: chrono::Local::now().format("%Y-%m-%d").to_string(),
            job_description: truncate_text(job_description, TRACKED_DESCRIPTION_CHARS),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.company_name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "company_name",
            });
        }
        if self.job_title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "job_title" });
        }
        Ok(())
    }
}

/// 保存的简历版本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeVersion {
    pub name: String,
    pub yaml_content: String,
}

/// 清洗版本名：只保留字母数字、空格、`-`、`_`
pub fn sanitize_version_name(name: &str) -> Result<String, ValidationError> {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        Err(ValidationError::InvalidVersionName {
            name: name.to_string(),
        })
    } else {
        Ok(safe.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_truncates_description() {
        let description = "x".repeat(500);
        let record = ApplicationRecord::new("Acme", "Rust Engineer", &description);

        assert_eq!(record.status, ApplicationStatus::Applied);
        assert_eq!(record.job_description.chars().count(), TRACKED_DESCRIPTION_CHARS + 3);
        assert_eq!(record.date_applied.len(), 10);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_record_requires_company_and_title() {
        let record = ApplicationRecord::new(" ", "Engineer", "");
        assert_eq!(
            record.validate(),
            Err(ValidationError::MissingField {
                field: "company_name"
            })
        );
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!("interviewing".parse(), Ok(ApplicationStatus::Interviewing));
        assert_eq!(" Offer ".parse(), Ok(ApplicationStatus::Offer));
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_sanitize_version_name() {
        assert_eq!(sanitize_version_name("Acme / Backend v2!").unwrap(), "Acme  Backend v2");
        assert_eq!(sanitize_version_name("my_cv-2024").unwrap(), "my_cv-2024");
        assert!(sanitize_version_name("../..").is_err());
    }
}

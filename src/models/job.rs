use serde::Deserialize;

use crate::models::input::OutreachType;

/// 待处理的职位（一个 TOML 文件）
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    /// 输出文件名前缀
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    /// 职位描述；为空时从 source_url 导入
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub source_url: String,
    /// 简历 YAML 路径，相对于 TOML 文件所在目录
    pub resume_path: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default = "default_true")]
    pub cover_letter: bool,
    #[serde(default)]
    pub outreach: Option<OutreachType>,
    #[serde(default)]
    pub detect_ai: bool,

    /// 加载后填充
    #[serde(skip)]
    pub resume_yaml: String,
    #[serde(skip)]
    pub file_path: Option<String>,
}

fn default_true() -> bool {
    true
}

impl JobSpec {
    /// 是否需要先导入职位描述
    pub fn needs_import(&self) -> bool {
        self.job_description.trim().is_empty() && !self.source_url.trim().is_empty()
    }
}

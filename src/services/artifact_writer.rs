//! 产物写入服务 - 业务能力层
//!
//! 只负责把单个职位的结果写到输出目录，不关心流程

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::models::{pdf_file_name, AiDetectionReport, OutreachResult, OutreachVariants};
use crate::workflow::{CoverLetterResult, OptimizationResult};

/// 一份已写入的文档：PDF 和它的文本源（简历 YAML / 求职信正文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub pdf: PathBuf,
    pub source: PathBuf,
}

/// 产物写入服务
///
/// 文件名以职位名为前缀，例如 `acme_backend.pdf`、`acme_backend_Cover_Letter.pdf`
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写入简历 PDF 和最终 YAML
    pub async fn write_resume(&self, name: &str, result: &OptimizationResult) -> Result<WrittenDocument> {
        let stem = file_stem(name);
        let pdf = self.write_bytes(&pdf_file_name(&stem), &result.document.bytes).await?;
        let yaml = self
            .write_bytes(&format!("{}.yaml", stem), result.final_yaml().as_bytes())
            .await?;
        Ok(WrittenDocument { pdf, source: yaml })
    }

    /// 写入求职信 PDF 和纯文本
    pub async fn write_cover_letter(&self, name: &str, result: &CoverLetterResult) -> Result<WrittenDocument> {
        let stem = format!("{}_Cover_Letter", file_stem(name));
        let pdf = self.write_bytes(&pdf_file_name(&stem), &result.document.bytes).await?;
        let text = self
            .write_bytes(&format!("{}.txt", stem), result.text.as_bytes())
            .await?;
        Ok(WrittenDocument { pdf, source: text })
    }

    /// 写入外联消息（多封邮件按序号拼接）
    pub async fn write_outreach(&self, name: &str, variants: &OutreachVariants) -> Result<PathBuf> {
        let content = match variants.result() {
            OutreachResult::Single(text) => text.clone(),
            OutreachResult::Sequence(emails) => emails
                .iter()
                .enumerate()
                .map(|(i, email)| {
                    format!(
                        "#{} {}\nSubject: {}\n\n{}\n",
                        i + 1,
                        email.label,
                        email.subject,
                        email.body
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };
        self.write_bytes(&format!("{}_Outreach.txt", file_stem(name)), content.as_bytes())
            .await
    }

    /// 写入 AI 痕迹检测报告（JSON）
    pub async fn write_ai_report(&self, name: &str, report: &AiDetectionReport) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(report)?;
        self.write_bytes(&format!("{}_AI_Report.json", file_stem(name)), &json)
            .await
    }

    async fn write_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_dir.display()))?;

        let path = self.output_dir.join(file_name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("无法写入文件: {}", path.display()))?;
        debug!("写入 {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }
}

/// 文件名前缀：非字母数字字符替换为下划线
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "Tailored_Resume".to_string()
    } else {
        stem
    }
}

//! 工作流目录
//!
//! 每个用户操作对应一个工作流。定义在每次操作时新建：
//!
//! | 工作流 | 分组 |
//! |---|---|
//! | resume_optimization | rewrite → { ats_score, render } |
//! | ai_detection | detect_ai |
//! | cover_letter | generate_cover_letter → render_cover_letter_pdf |
//! | outreach | generate_outreach |
//! | linkedin_message | generate_linkedin |
//! | job_import | scrape-job |

use std::fmt;

use serde_json::json;

use crate::error::DefinitionError;
use crate::models::{InputField, WorkflowInput};
use crate::pipeline::stage::output_str;
use crate::pipeline::{Stage, StageKind, WorkflowDefinition};
use crate::workflow::job_url::normalize_job_url;

/// 可触发的工作流
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    ResumeOptimization,
    AiDetection,
    CoverLetter,
    Outreach,
    LinkedinMessage,
    JobImport,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 6] = [
        WorkflowKind::ResumeOptimization,
        WorkflowKind::AiDetection,
        WorkflowKind::CoverLetter,
        WorkflowKind::Outreach,
        WorkflowKind::LinkedinMessage,
        WorkflowKind::JobImport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::ResumeOptimization => "resume_optimization",
            WorkflowKind::AiDetection => "ai_detection",
            WorkflowKind::CoverLetter => "cover_letter",
            WorkflowKind::Outreach => "outreach",
            WorkflowKind::LinkedinMessage => "linkedin_message",
            WorkflowKind::JobImport => "job_import",
        }
    }

    /// 启动前必须非空的输入字段（按检查顺序）
    pub fn required_fields(&self) -> &'static [InputField] {
        match self {
            WorkflowKind::ResumeOptimization
            | WorkflowKind::CoverLetter
            | WorkflowKind::Outreach
            | WorkflowKind::LinkedinMessage => &[InputField::JobDescription, InputField::Resume],
            WorkflowKind::AiDetection => &[InputField::Resume],
            WorkflowKind::JobImport => &[InputField::SourceUrl],
        }
    }

    /// 新建该工作流的定义
    pub fn definition(&self) -> Result<WorkflowDefinition, DefinitionError> {
        match self {
            WorkflowKind::ResumeOptimization => resume_optimization(),
            WorkflowKind::AiDetection => ai_detection(),
            WorkflowKind::CoverLetter => cover_letter(),
            WorkflowKind::Outreach => outreach(),
            WorkflowKind::LinkedinMessage => linkedin_message(),
            WorkflowKind::JobImport => job_import(),
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 改写简历，然后并发评分和渲染
pub fn resume_optimization() -> Result<WorkflowDefinition, DefinitionError> {
    let rewrite = Stage::new(StageKind::Rewrite, |input, _| {
        Ok(json!({
            "job_description": input.job_description,
            "current_yaml": input.resume_yaml,
            "target_region": input.target_region,
            "user_comments": input.instructions,
            "model_version": input.model_version,
            "api_key": input.api_key,
        }))
    });

    let ats_score = Stage::new(StageKind::AtsScore, |input, outputs| {
        let yaml = output_str(outputs, StageKind::Rewrite, "yaml")?;
        Ok(json!({
            "job_description": input.job_description,
            "resume_yaml": yaml,
            "api_key": input.api_key,
        }))
    })
    .depends_on(&[StageKind::Rewrite]);

    let render = Stage::new(StageKind::Render, |input: &WorkflowInput, outputs| {
        let yaml = output_str(outputs, StageKind::Rewrite, "yaml")?;
        Ok(json!({
            "resume_yaml": yaml,
            "theme": input.theme_or_default(),
        }))
    })
    .depends_on(&[StageKind::Rewrite]);

    WorkflowDefinition::builder(WorkflowKind::ResumeOptimization.name())
        .phase("Rewriting resume for the job description...", vec![rewrite])
        .phase("Scoring ATS match and rendering PDF...", vec![ats_score, render])
        .complete_message("Resume optimized")
        .build()
}

/// 检测简历里的 AI 腔
pub fn ai_detection() -> Result<WorkflowDefinition, DefinitionError> {
    let detect = Stage::new(StageKind::DetectAi, |input, _| {
        Ok(json!({
            "resume_yaml": input.resume_yaml,
            "api_key": input.api_key,
        }))
    });

    WorkflowDefinition::builder(WorkflowKind::AiDetection.name())
        .phase("Analyzing writing patterns...", vec![detect])
        .complete_message("Analysis complete")
        .build()
}

/// 生成求职信并渲染成 PDF
pub fn cover_letter() -> Result<WorkflowDefinition, DefinitionError> {
    let generate = Stage::new(StageKind::GenerateCoverLetter, |input, _| {
        Ok(json!({
            "job_description": input.job_description,
            "resume_yaml": input.resume_yaml,
            "api_key": input.api_key,
        }))
    });

    let render = Stage::new(StageKind::RenderCoverLetterPdf, |input: &WorkflowInput, outputs| {
        let text = output_str(outputs, StageKind::GenerateCoverLetter, "cover_letter_text")?;
        Ok(json!({
            "resume_yaml": input.resume_yaml,
            "cover_letter_text": text,
            "theme": input.theme_or_default(),
        }))
    })
    .depends_on(&[StageKind::GenerateCoverLetter]);

    WorkflowDefinition::builder(WorkflowKind::CoverLetter.name())
        .phase("Drafting cover letter...", vec![generate])
        .phase("Rendering cover letter PDF...", vec![render])
        .complete_message("Cover letter ready")
        .build()
}

pub fn outreach() -> Result<WorkflowDefinition, DefinitionError> {
    let generate = Stage::new(StageKind::GenerateOutreach, |input, _| {
        Ok(json!({
            "job_description": input.job_description,
            "resume_yaml": input.resume_yaml,
            "outreach_type": input.outreach_type.tag(),
            "api_key": input.api_key,
        }))
    });

    WorkflowDefinition::builder(WorkflowKind::Outreach.name())
        .phase("Generating outreach message...", vec![generate])
        .complete_message("Outreach ready")
        .build()
}

pub fn linkedin_message() -> Result<WorkflowDefinition, DefinitionError> {
    let generate = Stage::new(StageKind::GenerateLinkedin, |input, _| {
        Ok(json!({
            "resume_yaml": input.resume_yaml,
            "job_description": input.job_description,
            "recruiters_name": input.recruiter_name,
            "recruiters_role": input.recruiter_role,
            "company_name": input.company_name,
            "type": input.message_format.tag(),
            "api_key": input.api_key,
        }))
    });

    WorkflowDefinition::builder(WorkflowKind::LinkedinMessage.name())
        .phase("Writing LinkedIn message...", vec![generate])
        .complete_message("LinkedIn message ready")
        .build()
}

/// 通过后端抓取职位描述（链接先规范化）
pub fn job_import() -> Result<WorkflowDefinition, DefinitionError> {
    let scrape = Stage::new(StageKind::ScrapeJob, |input, _| {
        let url = normalize_job_url(&input.source_url).map_err(|e| e.to_string())?;
        Ok(json!({ "url": url }))
    });

    WorkflowDefinition::builder(WorkflowKind::JobImport.name())
        .phase("Importing job description...", vec![scrape])
        .complete_message("Job description imported")
        .build()
}

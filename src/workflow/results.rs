//! 工作流结果
//!
//! 在运行完成后从 outputs 中一次性解析出强类型结果

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::models::{AiDetectionReport, AtsReport, OutreachResult, OutreachVariants, RenderedDocument};
use crate::pipeline::stage::output_str;
use crate::pipeline::{PipelineRun, RunState, StageKind, StageOutputs};

/// 从阶段输出构造结果
pub trait FromOutputs: Sized {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self>;
}

/// 运行结果转为强类型结果
///
/// 只有 complete 状态的运行才有可用结果；error 状态带出失败原因
pub fn collect<T: FromOutputs>(run: &PipelineRun) -> AppResult<T> {
    match &run.state {
        RunState::Complete => T::from_outputs(&run.outputs),
        RunState::Error { reason } => Err(AppError::stage(run.workflow.clone(), reason.clone())),
        other => Err(AppError::stage(
            run.workflow.clone(),
            format!("run is not finished ({})", other),
        )),
    }
}

fn payload(outputs: &StageOutputs, stage: StageKind) -> AppResult<&JsonValue> {
    outputs
        .get(&stage)
        .ok_or_else(|| AppError::stage(stage.id(), format!("{} produced no output", stage)))
}

fn parse<T: DeserializeOwned>(outputs: &StageOutputs, stage: StageKind) -> AppResult<T> {
    let value = payload(outputs, stage)?.clone();
    serde_json::from_value(value).map_err(|e| AppError::stage(stage.id(), e.to_string()))
}

fn text(outputs: &StageOutputs, stage: StageKind, field: &str) -> AppResult<String> {
    output_str(outputs, stage, field)
        .map(str::to_string)
        .map_err(|reason| AppError::stage(stage.id(), reason))
}

fn document(outputs: &StageOutputs, stage: StageKind) -> AppResult<RenderedDocument> {
    RenderedDocument::from_payload(payload(outputs, stage)?)
        .map_err(|reason| AppError::stage(stage.id(), reason))
}

/// 简历优化结果
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// 改写后的 YAML
    pub yaml: String,
    pub ats: AtsReport,
    pub document: RenderedDocument,
}

impl OptimizationResult {
    /// 渲染实际使用的 YAML（后端有修正时以修正为准）
    pub fn final_yaml(&self) -> &str {
        self.document.final_yaml.as_deref().unwrap_or(&self.yaml)
    }
}

impl FromOutputs for OptimizationResult {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        Ok(Self {
            yaml: text(outputs, StageKind::Rewrite, "yaml")?,
            ats: parse(outputs, StageKind::AtsScore)?,
            document: document(outputs, StageKind::Render)?,
        })
    }
}

impl FromOutputs for AiDetectionReport {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        parse(outputs, StageKind::DetectAi)
    }
}

/// 求职信结果
#[derive(Debug, Clone, PartialEq)]
pub struct CoverLetterResult {
    pub text: String,
    pub document: RenderedDocument,
}

impl FromOutputs for CoverLetterResult {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        Ok(Self {
            text: text(outputs, StageKind::GenerateCoverLetter, "cover_letter_text")?,
            document: document(outputs, StageKind::RenderCoverLetterPdf)?,
        })
    }
}

impl FromOutputs for OutreachVariants {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        let result = OutreachResult::from_payload(payload(outputs, StageKind::GenerateOutreach)?)
            .map_err(|reason| AppError::stage(StageKind::GenerateOutreach.id(), reason))?;
        Ok(OutreachVariants::new(result))
    }
}

/// LinkedIn 消息正文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedinMessage(pub String);

impl FromOutputs for LinkedinMessage {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        text(outputs, StageKind::GenerateLinkedin, "content").map(LinkedinMessage)
    }
}

/// 导入的职位描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedJob {
    pub description: String,
}

impl FromOutputs for ImportedJob {
    fn from_outputs(outputs: &StageOutputs) -> AppResult<Self> {
        let description = text(outputs, StageKind::ScrapeJob, "description")?;
        let description = description.trim();
        if description.is_empty() {
            return Err(crate::error::ExtractionError::NotFound.into());
        }
        Ok(Self {
            description: description.to_string(),
        })
    }
}

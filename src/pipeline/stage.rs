//! 阶段定义
//!
//! 一个阶段 = 一次远程请求/响应。这里只描述"调用哪个接口、请求体怎么构造"，
//! 不关心调用如何执行

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::models::WorkflowInput;

/// 已完成阶段的输出（阶段 id → 成功载荷）
pub type StageOutputs = BTreeMap<StageKind, JsonValue>;

/// 后端提供的全部远程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    Rewrite,
    AtsScore,
    Render,
    DetectAi,
    GenerateCoverLetter,
    RenderCoverLetterPdf,
    GenerateOutreach,
    GenerateLinkedin,
    ScrapeJob,
}

impl StageKind {
    pub const ALL: [StageKind; 9] = [
        StageKind::Rewrite,
        StageKind::AtsScore,
        StageKind::Render,
        StageKind::DetectAi,
        StageKind::GenerateCoverLetter,
        StageKind::RenderCoverLetterPdf,
        StageKind::GenerateOutreach,
        StageKind::GenerateLinkedin,
        StageKind::ScrapeJob,
    ];

    /// 阶段 id，同时也是后端路径
    pub fn id(&self) -> &'static str {
        match self {
            StageKind::Rewrite => "rewrite",
            StageKind::AtsScore => "ats_score",
            StageKind::Render => "render",
            StageKind::DetectAi => "detect_ai",
            StageKind::GenerateCoverLetter => "generate_cover_letter",
            StageKind::RenderCoverLetterPdf => "render_cover_letter_pdf",
            StageKind::GenerateOutreach => "generate_outreach",
            StageKind::GenerateLinkedin => "generate_linkedin",
            StageKind::ScrapeJob => "scrape-job",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.id())
    }

    /// 服务没有给出 detail 时使用的通用失败描述
    pub fn generic_failure(&self) -> &'static str {
        match self {
            StageKind::Rewrite => "AI rewrite failed",
            StageKind::AtsScore => "Could not calculate ATS score",
            StageKind::Render => "Render failed",
            StageKind::DetectAi => "Failed to analyze AI patterns.",
            StageKind::GenerateCoverLetter => "Failed to generate cover letter.",
            StageKind::RenderCoverLetterPdf => "PDF Generation failed",
            StageKind::GenerateOutreach => "Failed to generate outreach message",
            StageKind::GenerateLinkedin => "Failed to generate LinkedIn message",
            StageKind::ScrapeJob => "Failed to scrape URL",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 失败来源，控制器只透传 reason，这里仅用于日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 请求没有完成（连接失败、超时）
    Transport,
    /// 非成功状态码
    Status,
    /// 响应体无法解析或缺少必要字段
    Malformed,
    /// 响应里带有服务端报告的错误字段
    Reported,
}

/// 阶段失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: StageKind,
    pub kind: FailureKind,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: StageKind, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            reason: reason.into(),
        }
    }

    /// 使用阶段的通用描述
    pub fn generic(stage: StageKind, kind: FailureKind) -> Self {
        Self::new(stage, kind, stage.generic_failure())
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.reason)
    }
}

/// 远程阶段的结果：成功带载荷，失败带原因
#[derive(Debug, Clone, PartialEq)]
pub enum StageResult<T> {
    Success(T),
    Failure(StageFailure),
}

impl<T> StageResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, StageResult::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageResult<U> {
        match self {
            StageResult::Success(value) => StageResult::Success(f(value)),
            StageResult::Failure(failure) => StageResult::Failure(failure),
        }
    }

    pub fn into_result(self) -> Result<T, StageFailure> {
        match self {
            StageResult::Success(value) => Ok(value),
            StageResult::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, StageFailure>> for StageResult<T> {
    fn from(result: Result<T, StageFailure>) -> Self {
        match result {
            Ok(value) => StageResult::Success(value),
            Err(failure) => StageResult::Failure(failure),
        }
    }
}

/// 请求构造函数：(工作流输入, 依赖阶段输出) → 请求体
///
/// 返回 Err 时视为该阶段失败（例如依赖输出缺少字段）
pub type RequestBuilder =
    Arc<dyn Fn(&WorkflowInput, &StageOutputs) -> Result<JsonValue, String> + Send + Sync>;

/// 工作流中的一个阶段
#[derive(Clone)]
pub struct Stage {
    kind: StageKind,
    depends_on: Vec<StageKind>,
    request_builder: RequestBuilder,
}

impl Stage {
    pub fn new<F>(kind: StageKind, request_builder: F) -> Self
    where
        F: Fn(&WorkflowInput, &StageOutputs) -> Result<JsonValue, String> + Send + Sync + 'static,
    {
        Self {
            kind,
            depends_on: Vec::new(),
            request_builder: Arc::new(request_builder),
        }
    }

    pub fn depends_on(mut self, dependencies: &[StageKind]) -> Self {
        self.depends_on = dependencies.to_vec();
        self
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn dependencies(&self) -> &[StageKind] {
        &self.depends_on
    }

    /// 构造请求体；构造失败时按"响应格式错误"处理
    pub fn build_request(
        &self,
        input: &WorkflowInput,
        outputs: &StageOutputs,
    ) -> Result<JsonValue, StageFailure> {
        (self.request_builder)(input, outputs)
            .map_err(|reason| StageFailure::new(self.kind, FailureKind::Malformed, reason))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("kind", &self.kind)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

/// 从依赖输出中取出字符串字段
pub fn output_str<'a>(
    outputs: &'a StageOutputs,
    stage: StageKind,
    field: &str,
) -> Result<&'a str, String> {
    outputs
        .get(&stage)
        .and_then(|payload| payload.get(field))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| format!("{} response is missing \"{}\"", stage, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_ids_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(StageKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(StageKind::ScrapeJob.path(), "/scrape-job");
        assert_eq!(StageKind::from_id("versions"), None);
    }

    #[test]
    fn test_build_request_failure_is_malformed() {
        let stage = Stage::new(StageKind::Render, |_, outputs| {
            let yaml = output_str(outputs, StageKind::Rewrite, "yaml")?;
            Ok(json!({ "resume_yaml": yaml }))
        })
        .depends_on(&[StageKind::Rewrite]);

        let mut outputs = StageOutputs::new();
        outputs.insert(StageKind::Rewrite, json!({ "unexpected": true }));

        let failure = stage
            .build_request(&WorkflowInput::default(), &outputs)
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Malformed);
        assert_eq!(failure.reason, "rewrite response is missing \"yaml\"");
    }

    #[test]
    fn test_stage_result_conversions() {
        let ok: StageResult<i32> = Ok(3).into();
        assert!(ok.is_success());
        assert_eq!(ok.map(|v| v * 2).into_result(), Ok(6));

        let failure = StageFailure::generic(StageKind::DetectAi, FailureKind::Transport);
        let err: StageResult<i32> = Err(failure.clone()).into();
        assert_eq!(err.into_result(), Err(failure));
    }
}

//! 流程层（Workflow）
//!
//! 定义每个用户操作的阶段结构，以及启动前的输入校验：
//!
//! ```text
//! WorkflowInput ──校验──▶ WorkflowKind::definition()
//!                              ↓
//!                     PipelineController::run
//!                              ↓
//!                     results::collect::<T>()
//! ```

pub mod catalog;
pub mod job_url;
pub mod results;

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::WorkflowInput;
use crate::pipeline::{PipelineController, PipelineRun};

pub use catalog::WorkflowKind;
pub use job_url::normalize_job_url;
pub use results::{
    collect, CoverLetterResult, FromOutputs, ImportedJob, LinkedinMessage, OptimizationResult,
};

/// 校验输入后执行工作流，返回终态运行
///
/// 缺少必填字段时直接返回校验错误，不发起任何远程调用
pub async fn launch(
    controller: &PipelineController,
    kind: WorkflowKind,
    input: WorkflowInput,
) -> AppResult<PipelineRun> {
    if let Err(e) = input.require(kind.required_fields()) {
        warn!("⚠️  {} 输入校验失败: {}", kind, e);
        return Err(e.into());
    }

    let definition = kind.definition()?;
    info!("🚀 启动工作流: {}", kind);
    Ok(controller.run(definition, input).await)
}

/// 执行工作流并解析强类型结果
pub async fn execute<T: FromOutputs>(
    controller: &PipelineController,
    kind: WorkflowKind,
    input: WorkflowInput,
) -> AppResult<T> {
    let run = launch(controller, kind, input).await?;
    collect(&run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::{AppError, ValidationError};
    use crate::pipeline::ScriptedExecutor;

    #[tokio::test]
    async fn test_missing_field_issues_no_remote_call() {
        let executor = Arc::new(ScriptedExecutor::new());
        let controller = PipelineController::new(executor.clone());

        let input = WorkflowInput {
            resume_yaml: "cv: {}".to_string(),
            ..Default::default()
        };
        let err = launch(&controller, WorkflowKind::ResumeOptimization, input)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingField {
                field: "job_description"
            })
        ));
        assert!(executor.calls().is_empty());
    }
}

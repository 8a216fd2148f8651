//! 工作流定义
//!
//! 工作流 = 有序的分组（phase），组内阶段并发，组与组之间严格先后。
//! 定义在每次用户操作时新建，构建后不可变

use std::collections::HashSet;

use crate::error::DefinitionError;
use crate::pipeline::stage::{Stage, StageKind};

/// 一组并发执行的阶段
#[derive(Debug, Clone)]
pub struct Phase {
    status_message: String,
    stages: Vec<Stage>,
}

impl Phase {
    /// 进入该组时显示的状态文本
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }
}

/// 工作流定义
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    name: String,
    phases: Vec<Phase>,
    complete_message: String,
}

impl WorkflowDefinition {
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder {
            name: name.into(),
            phases: Vec::new(),
            complete_message: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// 完成时显示的状态文本
    pub fn complete_message(&self) -> &str {
        &self.complete_message
    }

    /// 所有阶段 id，按声明顺序
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.phases.iter().flat_map(Phase::stage_kinds).collect()
    }
}

/// 工作流构建器
pub struct WorkflowBuilder {
    name: String,
    phases: Vec<Phase>,
    complete_message: Option<String>,
}

impl WorkflowBuilder {
    /// 追加一组并发阶段
    pub fn phase(mut self, status_message: impl Into<String>, stages: Vec<Stage>) -> Self {
        self.phases.push(Phase {
            status_message: status_message.into(),
            stages,
        });
        self
    }

    pub fn complete_message(mut self, message: impl Into<String>) -> Self {
        self.complete_message = Some(message.into());
        self
    }

    /// 校验并构建
    ///
    /// - 至少一组，且每组非空
    /// - 阶段 id 唯一
    /// - 依赖只能指向之前分组中的阶段（因此无环）
    pub fn build(self) -> Result<WorkflowDefinition, DefinitionError> {
        if self.phases.is_empty() {
            return Err(DefinitionError::Empty {
                workflow: self.name,
            });
        }

        let mut declared: HashSet<StageKind> = HashSet::new();
        for (index, phase) in self.phases.iter().enumerate() {
            if phase.stages.is_empty() {
                return Err(DefinitionError::EmptyPhase {
                    workflow: self.name.clone(),
                    phase: index,
                });
            }

            for stage in &phase.stages {
                if let Some(dependency) = stage
                    .dependencies()
                    .iter()
                    .find(|dependency| !declared.contains(dependency))
                {
                    return Err(DefinitionError::UnknownDependency {
                        stage: stage.id().to_string(),
                        dependency: dependency.id().to_string(),
                    });
                }
            }

            // 同组阶段互不可见，整组校验完再登记
            for stage in &phase.stages {
                if !declared.insert(stage.kind()) {
                    return Err(DefinitionError::DuplicateStage {
                        stage: stage.id().to_string(),
                    });
                }
            }
        }

        let complete_message = self
            .complete_message
            .unwrap_or_else(|| format!("{} complete", self.name));

        Ok(WorkflowDefinition {
            name: self.name,
            phases: self.phases,
            complete_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stage(kind: StageKind) -> Stage {
        Stage::new(kind, |_, _| Ok(json!({})))
    }

    #[test]
    fn test_two_level_workflow_builds() {
        let workflow = WorkflowDefinition::builder("optimize")
            .phase("Rewriting...", vec![stage(StageKind::Rewrite)])
            .phase(
                "Scoring and rendering...",
                vec![
                    stage(StageKind::AtsScore).depends_on(&[StageKind::Rewrite]),
                    stage(StageKind::Render).depends_on(&[StageKind::Rewrite]),
                ],
            )
            .build()
            .unwrap();

        assert_eq!(workflow.phase_count(), 2);
        assert_eq!(
            workflow.stage_kinds(),
            vec![StageKind::Rewrite, StageKind::AtsScore, StageKind::Render]
        );
        assert_eq!(workflow.phases()[1].status_message(), "Scoring and rendering...");
        assert_eq!(workflow.complete_message(), "optimize complete");
    }

    #[test]
    fn test_dependency_on_sibling_is_rejected() {
        let err = WorkflowDefinition::builder("bad")
            .phase(
                "both",
                vec![
                    stage(StageKind::Rewrite),
                    stage(StageKind::Render).depends_on(&[StageKind::Rewrite]),
                ],
            )
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            DefinitionError::UnknownDependency {
                stage: "render".to_string(),
                dependency: "rewrite".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_and_empty_are_rejected() {
        let err = WorkflowDefinition::builder("dup")
            .phase("a", vec![stage(StageKind::Render)])
            .phase("b", vec![stage(StageKind::Render)])
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateStage { .. }));

        let err = WorkflowDefinition::builder("none").build().unwrap_err();
        assert!(matches!(err, DefinitionError::Empty { .. }));

        let err = WorkflowDefinition::builder("hollow")
            .phase("a", vec![stage(StageKind::Render)])
            .phase("b", Vec::new())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::EmptyPhase {
                workflow: "hollow".to_string(),
                phase: 1
            }
        );
    }
}

//! 流水线层（Pipeline）
//!
//! 与具体业务无关的执行引擎：
//!
//! ```text
//! WorkflowDefinition (分组 + 阶段)
//!     ↓
//! PipelineController (状态机 / 状态文本 / 事件)
//!     ↓                    ↘
//! StageExecutor (一次远程调用)   ElapsedTimer (独立 tick)
//! ```

pub mod controller;
pub mod definition;
pub mod executor;
pub mod scripted;
pub mod stage;
pub mod timer;

pub use controller::{PipelineController, PipelineEvent, PipelineRun, RunState};
pub use definition::{Phase, WorkflowBuilder, WorkflowDefinition};
pub use executor::StageExecutor;
pub use scripted::ScriptedExecutor;
pub use stage::{FailureKind, Stage, StageFailure, StageKind, StageOutputs, StageResult};
pub use timer::ElapsedTimer;

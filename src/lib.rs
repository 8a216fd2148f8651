//! # Resume Tailor
//!
//! 根据职位描述定制简历、求职信和外联消息的批处理客户端
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `browser/` - 连接调试端口 / 启动无头浏览器
//!
//! ### ② 客户端与能力层（Clients / Services）
//! - `clients/` - 后端 HTTP 调用：`HttpStageExecutor`（流水线阶段）、`BackendClient`（版本 / 投递记录）
//! - `extraction/` - 职位描述提取启发式
//! - `services/` - 职位导入、产物写入
//!
//! ### ③ 流水线层（Pipeline）
//! - `WorkflowDefinition` - 分组 + 阶段的声明式结构
//! - `PipelineController` - 状态机、状态文本、事件，组内并发 + 失败即停
//! - `ElapsedTimer` - 运行期间每秒递增
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/catalog` - 各用户操作的工作流定义
//! - `workflow/results` - 从阶段输出解析强类型结果
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理职位文件，管理并发
//! - `orchestrator/job_processor` - 单个职位的完整流程

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod extraction;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use extraction::{ContentExtractionHeuristic, Extraction};
pub use infrastructure::JsExecutor;
pub use models::{JobSpec, WorkflowInput};
pub use orchestrator::{App, ProcessingStats};
pub use pipeline::{
    ElapsedTimer, PipelineController, PipelineEvent, PipelineRun, RunState, StageExecutor,
    StageResult, WorkflowDefinition,
};
pub use workflow::WorkflowKind;

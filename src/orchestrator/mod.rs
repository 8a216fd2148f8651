//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量职位处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载职位（Vec<JobSpec>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `job_processor` - 单个职位处理器
//! - 导入 → AI 检测 → 简历优化 → 求职信 → 外联 → 投递记录
//! - 每个职位一个 PipelineController
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<JobSpec>)
//!     ↓
//! job_processor (处理单个 JobSpec)
//!     ↓
//! workflow (工作流目录 + 结果解析)
//!     ↓
//! pipeline (控制器 / 阶段执行器 / 计时器)
//!     ↓
//! clients / services / infrastructure
//! ```

pub mod batch_processor;
pub mod job_processor;

pub use batch_processor::{App, ProcessingStats};
pub use job_processor::{process_job, JobContext};

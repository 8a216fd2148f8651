//! 阶段执行器接口
//!
//! 执行一次远程调用并把结果归一化成 `StageResult`。不重试，不做传输层之外的超时

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::pipeline::stage::{StageKind, StageResult};

/// 阶段执行器
///
/// 职责：
/// - 对一个阶段发起一次请求
/// - 把传输错误、非成功状态、无法解析的响应体、服务端报错统一成 Failure
/// - 调用之间无状态
#[async_trait]
pub trait StageExecutor: Send + Sync {
    async fn execute(&self, stage: StageKind, request: JsonValue) -> StageResult<JsonValue>;
}

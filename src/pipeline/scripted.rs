//! 内存脚本执行器
//!
//! 按阶段预置响应和延迟，不走网络。用于测试和离线演练

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::pipeline::executor::StageExecutor;
use crate::pipeline::stage::{FailureKind, StageFailure, StageKind, StageResult};

#[derive(Clone)]
struct Script {
    delay: Duration,
    result: StageResult<JsonValue>,
}

/// 脚本执行器
///
/// 未预置的阶段返回 Transport 失败。所有收到的请求按到达顺序记录
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: HashMap<StageKind, Script>,
    calls: Mutex<Vec<(StageKind, JsonValue)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置成功响应
    pub fn succeed(self, stage: StageKind, payload: JsonValue) -> Self {
        self.succeed_after(stage, Duration::ZERO, payload)
    }

    pub fn succeed_after(mut self, stage: StageKind, delay: Duration, payload: JsonValue) -> Self {
        self.scripts.insert(
            stage,
            Script {
                delay,
                result: StageResult::Success(payload),
            },
        );
        self
    }

    /// 预置服务端报错
    pub fn fail(self, stage: StageKind, reason: impl Into<String>) -> Self {
        self.fail_after(stage, Duration::ZERO, reason)
    }

    pub fn fail_after(mut self, stage: StageKind, delay: Duration, reason: impl Into<String>) -> Self {
        self.scripts.insert(
            stage,
            Script {
                delay,
                result: StageResult::Failure(StageFailure::new(
                    stage,
                    FailureKind::Reported,
                    reason,
                )),
            },
        );
        self
    }

    /// 已收到的请求（阶段, 请求体）
    pub fn calls(&self) -> Vec<(StageKind, JsonValue)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn called_stages(&self) -> Vec<StageKind> {
        self.calls().into_iter().map(|(stage, _)| stage).collect()
    }

    /// 某阶段收到的请求体
    pub fn request_for(&self, stage: StageKind) -> Option<JsonValue> {
        self.calls()
            .into_iter()
            .find(|(called, _)| *called == stage)
            .map(|(_, request)| request)
    }
}

#[async_trait]
impl StageExecutor for ScriptedExecutor {
    async fn execute(&self, stage: StageKind, request: JsonValue) -> StageResult<JsonValue> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((stage, request));
        }

        let Some(script) = self.scripts.get(&stage).cloned() else {
            return StageResult::Failure(StageFailure::generic(stage, FailureKind::Transport));
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        debug!("脚本阶段 {} 完成 (成功: {})", stage, script.result.is_success());
        script.result
    }
}

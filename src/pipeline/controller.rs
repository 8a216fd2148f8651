//! 流水线控制器
//!
//! 按分组顺序驱动一个工作流：组内阶段并发发起，全部成功后进入下一组；
//! 任一阶段失败立即进入 error，其余仍在进行的调用不取消，结果直接丢弃
//!
//! ```text
//! idle → running(0) → running(1) → … → complete
//!          └──────────┴──────────────→ error(reason)
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::WorkflowInput;
use crate::pipeline::definition::{Phase, WorkflowDefinition};
use crate::pipeline::executor::StageExecutor;
use crate::pipeline::stage::{
    FailureKind, StageFailure, StageKind, StageOutputs, StageResult,
};
use crate::pipeline::timer::ElapsedTimer;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 空闲时的状态文本
pub const IDLE_MESSAGE: &str = "Ready";

/// 运行状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { phase: usize },
    Complete,
    Error { reason: String },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Error { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running { phase } => write!(f, "running({})", phase),
            RunState::Complete => write!(f, "complete"),
            RunState::Error { reason } => write!(f, "error({})", reason),
        }
    }
}

/// 一次运行的快照
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub workflow: String,
    pub state: RunState,
    /// 已成功阶段的载荷；出错后保留之前的结果，仅供排查
    pub outputs: StageOutputs,
    pub status_message: String,
    pub elapsed_seconds: u64,
}

impl PipelineRun {
    fn idle(workflow: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            state: RunState::Idle,
            outputs: StageOutputs::new(),
            status_message: IDLE_MESSAGE.to_string(),
            elapsed_seconds: 0,
        }
    }

    /// 失败原因（仅 error 状态）
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            RunState::Error { reason } => Some(reason),
            _ => None,
        }
    }
}

/// 发布给观察者的事件
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged {
        state: RunState,
        status_message: String,
    },
    StageResolved {
        stage: StageKind,
        success: bool,
    },
}

/// 流水线控制器
///
/// 职责：
/// - 唯一写入 `PipelineRun` 的地方
/// - 维护状态机和状态文本
/// - 启停计时器
/// - 不负责阻止同一槽位并发启动（由触发方保证）
#[derive(Clone)]
pub struct PipelineController {
    executor: Arc<dyn StageExecutor>,
    run: Arc<Mutex<PipelineRun>>,
    events: broadcast::Sender<PipelineEvent>,
    timer: ElapsedTimer,
}

impl PipelineController {
    pub fn new(executor: Arc<dyn StageExecutor>) -> Self {
        Self::with_tick(executor, Duration::from_secs(1))
    }

    /// 自定义计时周期
    pub fn with_tick(executor: Arc<dyn StageExecutor>, tick: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            executor,
            run: Arc::new(Mutex::new(PipelineRun::idle(""))),
            events,
            timer: ElapsedTimer::new(tick),
        }
    }

    /// 订阅状态事件
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// 当前运行快照
    pub fn snapshot(&self) -> PipelineRun {
        let mut run = self.lock_run().clone();
        run.elapsed_seconds = self.timer.elapsed();
        run
    }

    /// 非阻塞启动，完成情况通过事件 / 快照观察
    pub fn start(&self, workflow: WorkflowDefinition, input: WorkflowInput) -> JoinHandle<PipelineRun> {
        let controller = self.clone();
        tokio::spawn(async move { controller.run(workflow, input).await })
    }

    /// 执行完整个工作流，返回终态快照
    pub async fn run(&self, workflow: WorkflowDefinition, input: WorkflowInput) -> PipelineRun {
        if self.lock_run().state.is_running() {
            warn!("⚠️ 控制器上已有运行中的工作流，仍然开始新的运行: {}", workflow.name());
        }

        {
            let mut run = self.lock_run();
            *run = PipelineRun::idle(workflow.name());
        }
        self.transition(RunState::Idle, IDLE_MESSAGE.to_string());

        info!(
            "▶ 开始工作流 {} (共 {} 组)",
            workflow.name(),
            workflow.phase_count()
        );

        for (index, phase) in workflow.phases().iter().enumerate() {
            self.transition(
                RunState::Running { phase: index },
                phase.status_message().to_string(),
            );

            if let Err(failure) = self.run_phase(index, phase, &input).await {
                error!(
                    "❌ 工作流 {} 第 {} 组失败: {}",
                    workflow.name(),
                    index,
                    failure
                );
                self.transition(
                    RunState::Error {
                        reason: failure.reason.clone(),
                    },
                    format!("Error: {}", failure.reason),
                );
                return self.snapshot();
            }
        }

        info!("✓ 工作流 {} 完成", workflow.name());
        self.transition(RunState::Complete, workflow.complete_message().to_string());
        self.snapshot()
    }

    /// 执行一组：全部并发发起，等待全部成功；第一个失败立即返回
    async fn run_phase(
        &self,
        index: usize,
        phase: &Phase,
        input: &WorkflowInput,
    ) -> Result<(), StageFailure> {
        let outputs = self.lock_run().outputs.clone();
        let mut pending = FuturesUnordered::new();

        for stage in phase.stages() {
            let request = stage.build_request(input, &outputs)?;
            let executor = Arc::clone(&self.executor);
            let kind = stage.kind();
            debug!("[组 {}] 发起阶段 {}", index, kind);

            // 独立任务：失败提前返回时，剩余调用继续跑完但结果被丢弃
            let handle = tokio::spawn(async move { executor.execute(kind, request).await });
            pending.push(async move { (kind, handle.await) });
        }

        while let Some((kind, joined)) = pending.next().await {
            let result = joined.unwrap_or_else(|e| {
                StageResult::Failure(StageFailure::new(
                    kind,
                    FailureKind::Transport,
                    format!("{}: {}", kind.generic_failure(), e),
                ))
            });

            match result {
                StageResult::Success(payload) => {
                    debug!("[组 {}] ✓ 阶段 {} 成功", index, kind);
                    self.lock_run().outputs.insert(kind, payload);
                    self.emit(PipelineEvent::StageResolved {
                        stage: kind,
                        success: true,
                    });
                }
                StageResult::Failure(failure) => {
                    warn!("[组 {}] ⚠️ 阶段 {} 失败 ({:?}): {}", index, kind, failure.kind, failure.reason);
                    self.emit(PipelineEvent::StageResolved {
                        stage: kind,
                        success: false,
                    });
                    return Err(failure);
                }
            }
        }

        Ok(())
    }

    fn transition(&self, state: RunState, status_message: String) {
        match &state {
            RunState::Running { .. } => self.timer.start(),
            RunState::Idle | RunState::Complete | RunState::Error { .. } => self.timer.reset(),
        }

        {
            let mut run = self.lock_run();
            debug!("状态变更: {} → {}", run.state, state);
            run.state = state.clone();
            run.status_message = status_message.clone();
        }

        self.emit(PipelineEvent::StateChanged {
            state,
            status_message,
        });
    }

    fn emit(&self, event: PipelineEvent) {
        // 没有订阅者时发送失败，忽略即可
        let _ = self.events.send(event);
    }

    fn lock_run(&self) -> MutexGuard<'_, PipelineRun> {
        self.run
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

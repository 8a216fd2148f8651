//! 运行计时器
//!
//! 运行期间每个周期加一，进入 idle / complete / error 时归零

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// 计时器
///
/// 由独立的 tick 任务累加，控制器负责启停。`reset` 可重复调用
#[derive(Clone)]
pub struct ElapsedTimer {
    ticks: Arc<AtomicU64>,
    period: Duration,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ElapsedTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            period,
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    /// 当前计数
    pub fn elapsed(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.lock_ticker().is_some()
    }

    /// 从 0 开始计时；已在运行时不做任何事
    pub fn start(&self) {
        let mut ticker = self.lock_ticker();
        if ticker.is_some() {
            return;
        }

        self.ticks.store(0, Ordering::SeqCst);
        let ticks = Arc::clone(&self.ticks);
        let period = self.period;
        *ticker = Some(tokio::spawn(async move {
            let mut clock = interval(period);
            clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 第一次 tick 立即返回
            clock.tick().await;
            loop {
                clock.tick().await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    /// 停止并归零
    pub fn reset(&self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }
        self.ticks.store(0, Ordering::SeqCst);
    }

    fn lock_ticker(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ElapsedTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

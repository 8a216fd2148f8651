//! 批量职位处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量职位的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志文件、创建阶段执行器和后端客户端
//! 2. **批量加载**：扫描并加载所有待处理的职位（`Vec<JobSpec>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量，每个职位一个控制器
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有职位的处理结果

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::{BackendClient, HttpStageExecutor};
use crate::config::Config;
use crate::models::{load_all_job_specs, JobSpec};
use crate::orchestrator::job_processor::{process_job, JobContext};
use crate::pipeline::StageExecutor;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    context: Arc<JobContext>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config.api_base_url, config.max_concurrent_jobs);

        let executor: Arc<dyn StageExecutor> = Arc::new(HttpStageExecutor::new(&config)?);
        let mut context = JobContext::new(config, executor);

        if context.config.track_applications {
            let backend = BackendClient::new(&context.config)?;
            context = context.with_backend(backend);
            info!("📌 已开启投递记录");
        }

        Ok(Self::with_context(context))
    }

    /// 使用自定义上下文（例如脚本执行器）
    pub fn with_context(context: JobContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let all_jobs = self.load_jobs().await?;

        if all_jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        let max_concurrent = self.max_concurrent();
        log_jobs_loaded(all_jobs.len(), max_concurrent);

        let stats = self.process_all_jobs(all_jobs).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.context.config.output_log_file,
        );

        Ok(stats)
    }

    fn max_concurrent(&self) -> usize {
        self.context.config.max_concurrent_jobs.max(1)
    }

    async fn load_jobs(&self) -> Result<Vec<JobSpec>> {
        info!("\n📁 正在扫描待处理的职位...");
        load_all_job_specs(&self.context.config.jobs_folder).await
    }

    async fn process_all_jobs(&self, all_jobs: Vec<JobSpec>) -> Result<ProcessingStats> {
        let max_concurrent = self.max_concurrent();
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total_jobs = all_jobs.len();
        let mut stats = ProcessingStats {
            total: total_jobs,
            ..Default::default()
        };

        let total_batches = total_jobs.div_ceil(max_concurrent);
        for (batch_index, batch_jobs) in all_jobs.chunks(max_concurrent).enumerate() {
            let batch_start = batch_index * max_concurrent;
            let batch_num = batch_index + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch_jobs.len(),
                total_jobs,
            );

            let batch_result = self
                .process_batch(batch_jobs, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }

    async fn process_batch(
        &self,
        batch_jobs: &[JobSpec],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        for (idx, job) in batch_jobs.iter().enumerate() {
            let job_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let context = Arc::clone(&self.context);
            let job = job.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = process_job(&context, job, job_index).await;
                if let Err(e) = &result {
                    error!("[职位 {}] ❌ 处理过程中发生错误: {:#}", job_index, e);
                }
                result
            });
            batch_handles.push((job_index, handle));
        }

        let mut result = BatchResult::default();
        for (job_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(())) => result.success += 1,
                Ok(Err(_)) => result.failed += 1,
                Err(e) => {
                    error!("[职位 {}] 任务执行失败: {}", job_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

// ========== 日志辅助函数 ==========

fn log_jobs_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的职位", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批职位: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 成功 {}/{}",
        batch_num,
        result.success,
        result.success + result.failed
    );
    info!("{}", "─".repeat(60));
}

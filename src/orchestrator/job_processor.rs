//! 单个职位处理器 - 编排层
//!
//! ## 职责
//!
//! 按顺序驱动一个职位的全部工作流：
//!
//! 1. **导入**：只有链接时先导入职位描述
//! 2. **AI 检测**（可选）：检测原始简历的 AI 腔
//! 3. **简历优化**：rewrite → { ats_score, render }
//! 4. **求职信**（可选）：基于优化后的简历
//! 5. **外联消息**（可选）
//! 6. **投递记录**（可选）：写入后端
//!
//! 每个职位独占一个 `PipelineController`，可选步骤失败只记录警告

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::clients::BackendClient;
use crate::config::Config;
use crate::models::{AiDetectionReport, ApplicationRecord, JobSpec, OutreachVariants, WorkflowInput};
use crate::pipeline::{PipelineController, PipelineEvent, StageExecutor};
use crate::services::{ArtifactWriter, JobImporter};
use crate::utils::logging::append_log_line;
use crate::workflow::{execute, CoverLetterResult, OptimizationResult, WorkflowKind};

/// 所有职位共享的资源
pub struct JobContext {
    pub config: Config,
    pub executor: Arc<dyn StageExecutor>,
    pub backend: Option<BackendClient>,
    pub importer: JobImporter,
    pub writer: ArtifactWriter,
}

impl JobContext {
    /// 离线上下文：不连后端存储，按配置选择导入方式
    pub fn new(config: Config, executor: Arc<dyn StageExecutor>) -> Self {
        Self {
            importer: JobImporter::from_config(&config),
            writer: ArtifactWriter::new(&config.output_dir),
            backend: None,
            executor,
            config,
        }
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(backend);
        self
    }

    fn controller(&self) -> PipelineController {
        PipelineController::with_tick(
            Arc::clone(&self.executor),
            Duration::from_millis(self.config.elapsed_tick_millis.max(1)),
        )
    }

    fn workflow_input(&self, job: &JobSpec) -> WorkflowInput {
        WorkflowInput {
            job_description: job.job_description.clone(),
            resume_yaml: job.resume_yaml.clone(),
            api_key: self.config.api_key.clone(),
            target_region: self.config.target_region.clone(),
            instructions: job.instructions.clone(),
            model_version: self.config.model_version.clone(),
            theme: job.theme.clone().unwrap_or_else(|| self.config.theme.clone()),
            outreach_type: job.outreach.unwrap_or_default(),
            company_name: job.company.clone(),
            source_url: job.source_url.clone(),
            ..Default::default()
        }
    }
}

/// 处理单个职位
///
/// # 返回
/// 主流程（导入 + 简历优化）成功时返回 Ok，其余步骤失败不影响结果
pub async fn process_job(context: &JobContext, mut job: JobSpec, job_index: usize) -> Result<()> {
    log_job_start(job_index, &job);

    let controller = context.controller();
    let status_logger = spawn_status_logger(&controller, job_index);

    if job.needs_import() {
        job.job_description = context
            .importer
            .import(&controller, &job.source_url)
            .await
            .with_context(|| format!("导入职位描述失败: {}", job.source_url))?;
    }

    let input = context.workflow_input(&job);

    // ========== AI 检测（原始简历） ==========
    if job.detect_ai {
        match execute::<AiDetectionReport>(&controller, WorkflowKind::AiDetection, input.clone()).await {
            Ok(report) => {
                info!(
                    "[职位 {}] 🤖 人类写作评分: {}/100，标记 {} 处",
                    job_index,
                    report.human_score,
                    report.items.len()
                );
                context.writer.write_ai_report(&job.name, &report).await?;
            }
            Err(e) => warn!("[职位 {}] ⚠️  AI 检测失败，继续: {}", job_index, e),
        }
    }

    // ========== 简历优化 ==========
    let optimized: OptimizationResult =
        execute(&controller, WorkflowKind::ResumeOptimization, input.clone())
            .await
            .context("简历优化失败")?;
    info!(
        "[职位 {}] 📈 ATS 评分: {} ({})",
        job_index,
        optimized.ats.score,
        optimized.ats.band().label()
    );
    if !optimized.ats.missing_keywords.is_empty() {
        info!(
            "[职位 {}] 缺少关键词: {}",
            job_index,
            optimized.ats.missing_keywords.join(", ")
        );
    }
    let written = context.writer.write_resume(&job.name, &optimized).await?;
    info!("[职位 {}] 💾 简历已写入: {}", job_index, written.pdf.display());

    // 后续步骤使用优化后的简历
    let tailored = WorkflowInput {
        resume_yaml: optimized.final_yaml().to_string(),
        ..input
    };

    // ========== 求职信 ==========
    if job.cover_letter {
        match execute::<CoverLetterResult>(&controller, WorkflowKind::CoverLetter, tailored.clone()).await {
            Ok(letter) => {
                let written = context.writer.write_cover_letter(&job.name, &letter).await?;
                info!("[职位 {}] ✉️  求职信已写入: {}", job_index, written.pdf.display());
            }
            Err(e) => warn!("[职位 {}] ⚠️  求职信生成失败: {}", job_index, e),
        }
    }

    // ========== 外联消息 ==========
    if job.outreach.is_some() {
        match execute::<OutreachVariants>(&controller, WorkflowKind::Outreach, tailored).await {
            Ok(variants) => {
                let path = context.writer.write_outreach(&job.name, &variants).await?;
                info!(
                    "[职位 {}] 📨 外联消息 ({} 条) 已写入: {}",
                    job_index,
                    variants.result().len(),
                    path.display()
                );
            }
            Err(e) => warn!("[职位 {}] ⚠️  外联消息生成失败: {}", job_index, e),
        }
    }

    // ========== 投递记录 ==========
    if context.config.track_applications {
        track_application(context, &job, job_index).await;
    }

    drop(controller);
    if let Err(e) = status_logger.await {
        debug!("状态日志任务结束异常: {}", e);
    }

    let summary = format!(
        "{} | {} - {} | ATS {}",
        job.name, job.company, job.title, optimized.ats.score
    );
    if let Err(e) = append_log_line(&context.config.output_log_file, &summary) {
        warn!("写入运行日志失败: {}", e);
    }

    info!("[职位 {}] ✅ 处理完成", job_index);
    Ok(())
}

/// 把控制器状态变化转成日志
fn spawn_status_logger(
    controller: &PipelineController,
    job_index: usize,
) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PipelineEvent::StateChanged { status_message, .. }) => {
                    debug!("[职位 {}] {}", job_index, status_message);
                }
                Ok(PipelineEvent::StageResolved { stage, success }) => {
                    debug!("[职位 {}] 阶段 {} {}", job_index, stage, if success { "✓" } else { "✗" });
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("[职位 {}] 跳过 {} 条状态事件", job_index, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn track_application(context: &JobContext, job: &JobSpec, job_index: usize) {
    let Some(backend) = &context.backend else {
        warn!("[职位 {}] 未配置后端存储，跳过投递记录", job_index);
        return;
    };

    let record = ApplicationRecord::new(&job.company, &job.title, &job.job_description);
    if let Err(e) = backend.create_application(&record).await {
        error!("[职位 {}] 投递记录写入失败: {}", job_index, e);
    }
}

fn log_job_start(job_index: usize, job: &JobSpec) {
    info!("\n[职位 {}] {}", job_index, "─".repeat(50));
    info!("[职位 {}] 📄 {} ({} - {})", job_index, job.name, job.company, job.title);
    if let Some(path) = &job.file_path {
        debug!("[职位 {}] 来源文件: {}", job_index, path);
    }
}

use crate::models::job::JobSpec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载职位，并读取其引用的简历 YAML
pub async fn load_job_spec(toml_file_path: &Path) -> Result<JobSpec> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut job: JobSpec = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    let base_dir = toml_file_path.parent().unwrap_or_else(|| Path::new("."));
    let resume_path = base_dir.join(&job.resume_path);
    job.resume_yaml = fs::read_to_string(&resume_path)
        .await
        .with_context(|| format!("无法读取简历文件: {}", resume_path.display()))?;

    job.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(job)
}

/// 加载文件夹中所有职位 TOML，单个文件失败只记录警告
pub async fn load_all_job_specs(folder_path: &str) -> Result<Vec<JobSpec>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    // 按文件名处理，顺序稳定
    paths.sort();

    let mut jobs = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_job_spec(&path).await {
            Ok(job) => jobs.push(job),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}

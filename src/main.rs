use anyhow::{Context, Result};
use resume_tailor::utils::logging;
use resume_tailor::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：命令行给出 TOML 路径时从文件读取，否则只读环境变量
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("加载配置失败: {}", path))?,
        None => Config::from_env().context("加载环境变量配置失败")?,
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    if stats.failed > 0 {
        tracing::warn!("⚠️ 有 {} 个职位处理失败", stats.failed);
    }

    Ok(())
}

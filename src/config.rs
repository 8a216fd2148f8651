use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端服务地址
    pub api_base_url: String,
    /// AI 服务凭证（可选，后端已配置时可为空）
    pub api_key: Option<String>,
    /// 改写目标地区
    pub target_region: String,
    /// 渲染主题
    pub theme: String,
    /// 改写使用的模型版本
    pub model_version: String,
    /// 传输层超时（秒），不做重试
    pub request_timeout_secs: u64,
    /// 计时器间隔（毫秒）
    pub elapsed_tick_millis: u64,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 无头浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 职位 TOML 文件存放目录
    pub jobs_folder: String,
    /// 输出目录（PDF / 求职信）
    pub output_dir: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 同时处理的职位数量
    pub max_concurrent_jobs: usize,
    /// 处理完成后是否写入投递记录
    pub track_applications: bool,
    /// 导入职位描述时用浏览器页面提取（否则走后端抓取）
    pub import_via_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_key: None,
            target_region: "international".to_string(),
            theme: "classic".to_string(),
            model_version: "gemini-3-flash-preview".to_string(),
            request_timeout_secs: 180,
            elapsed_tick_millis: 1000,
            browser_debug_port: 9222,
            chrome_executable: None,
            jobs_folder: "jobs".to_string(),
            output_dir: "output".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
            max_concurrent_jobs: 2,
            track_applications: false,
            import_via_browser: false,
        }
    }
}

/// 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    api_base_url: Option<String>,
    api_key: Option<String>,
    target_region: Option<String>,
    theme: Option<String>,
    model_version: Option<String>,
    request_timeout_secs: Option<u64>,
    elapsed_tick_millis: Option<u64>,
    browser_debug_port: Option<u16>,
    chrome_executable: Option<String>,
    jobs_folder: Option<String>,
    output_dir: Option<String>,
    output_log_file: Option<String>,
    verbose_logging: Option<bool>,
    max_concurrent_jobs: Option<usize>,
    track_applications: Option<bool>,
    import_via_browser: Option<bool>,
}

impl Config {
    /// 从环境变量加载，未设置的字段使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，再叠加环境变量
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())?.with_env_overrides()
    }

    fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            })?;

        let d = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(d.api_base_url),
            api_key: file.api_key.or(d.api_key),
            target_region: file.target_region.unwrap_or(d.target_region),
            theme: file.theme.unwrap_or(d.theme),
            model_version: file.model_version.unwrap_or(d.model_version),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(d.request_timeout_secs),
            elapsed_tick_millis: file.elapsed_tick_millis.unwrap_or(d.elapsed_tick_millis),
            browser_debug_port: file.browser_debug_port.unwrap_or(d.browser_debug_port),
            chrome_executable: file.chrome_executable.or(d.chrome_executable),
            jobs_folder: file.jobs_folder.unwrap_or(d.jobs_folder),
            output_dir: file.output_dir.unwrap_or(d.output_dir),
            output_log_file: file.output_log_file.unwrap_or(d.output_log_file),
            verbose_logging: file.verbose_logging.unwrap_or(d.verbose_logging),
            max_concurrent_jobs: file.max_concurrent_jobs.unwrap_or(d.max_concurrent_jobs),
            track_applications: file.track_applications.unwrap_or(d.track_applications),
            import_via_browser: file.import_via_browser.unwrap_or(d.import_via_browser),
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: env_string("API_BASE_URL").unwrap_or(self.api_base_url),
            api_key: env_string("GEMINI_API_KEY").or(self.api_key),
            target_region: env_string("TARGET_REGION").unwrap_or(self.target_region),
            theme: env_string("RESUME_THEME").unwrap_or(self.theme),
            model_version: env_string("MODEL_VERSION").unwrap_or(self.model_version),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            elapsed_tick_millis: env_parse("ELAPSED_TICK_MILLIS", "u64")?
                .unwrap_or(self.elapsed_tick_millis),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "u16")?
                .unwrap_or(self.browser_debug_port),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(self.chrome_executable),
            jobs_folder: env_string("JOBS_FOLDER").unwrap_or(self.jobs_folder),
            output_dir: env_string("OUTPUT_DIR").unwrap_or(self.output_dir),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS", "usize")?
                .unwrap_or(self.max_concurrent_jobs),
            track_applications: env_parse("TRACK_APPLICATIONS", "bool")?
                .unwrap_or(self.track_applications),
            import_via_browser: env_parse("IMPORT_VIA_BROWSER", "bool")?
                .unwrap_or(self.import_via_browser),
        })
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
    }
}

use thiserror::Error;

/// 应用程序错误类型
///
/// 对应四类错误来源：输入校验、远程阶段失败、内容提取失败，以及本地资源（浏览器 / 配置 / 存储）
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验失败（在发起任何远程调用之前）
    #[error("输入校验失败: {0}")]
    Validation(#[from] ValidationError),

    /// 远程阶段失败，reason 原样透传
    #[error("阶段 {stage} 失败: {reason}")]
    Stage { stage: String, reason: String },

    /// 内容提取失败
    #[error("内容提取失败: {0}")]
    Extraction(#[from] ExtractionError),

    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    /// 工作流定义错误
    #[error("工作流定义错误: {0}")]
    Definition(#[from] DefinitionError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 后端存储接口错误（版本 / 投递记录）
    #[error("存储接口错误: {0}")]
    Storage(String),

    /// HTTP 客户端构建失败
    #[error("HTTP客户端错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必填字段缺失或为空
    #[error("缺少必填字段: {field}")]
    MissingField { field: &'static str },

    /// 版本名清洗后为空
    #[error("无效的版本名: {name:?}")]
    InvalidVersionName { name: String },

    /// 输入内容格式不对（URL 等）
    #[error("{field} 格式无效: {value}")]
    InvalidFormat { field: &'static str, value: String },
}

/// 内容提取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// 没有任何定位规则命中合格内容
    #[error("页面中未检测到职位描述")]
    NotFound,
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 执行脚本失败
    #[error("执行脚本失败: {0}")]
    ScriptExecutionFailed(#[from] chromiumoxide::error::CdpError),

    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
}

/// 工作流定义错误（构建时校验）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("工作流 {workflow} 没有任何阶段")]
    Empty { workflow: String },

    #[error("工作流 {workflow} 的第 {phase} 组为空")]
    EmptyPhase { workflow: String, phase: usize },

    #[error("阶段 id 重复: {stage}")]
    DuplicateStage { stage: String },

    #[error("阶段 {stage} 依赖 {dependency}，但后者不在之前的分组中")]
    UnknownDependency { stage: String, dependency: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建阶段失败错误
    pub fn stage(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Stage {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// 创建缺少字段错误
    pub fn missing(field: &'static str) -> Self {
        AppError::Validation(ValidationError::MissingField { field })
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed(err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_carries_reason_verbatim() {
        let err = AppError::stage("render", "RenderCV generation failed");
        assert_eq!(err.to_string(), "阶段 render 失败: RenderCV generation failed");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: AppError = ValidationError::MissingField {
            field: "job_description",
        }
        .into();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("job_description"));
    }
}

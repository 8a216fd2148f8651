//! JS 执行器 - 基础设施层
//!
//! 持有页面资源，只暴露"在页面沙箱里执行脚本"的能力

use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::AppResult;

/// JS 执行器
///
/// 职责：
/// - 持有 Page
/// - 暴露 eval() 能力
/// - 不认识职位 / 简历，不做提取判断
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行脚本并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let js_code = js_code.into();
        debug!("执行页面脚本 ({} 字节)", js_code.len());
        let result = self.page.evaluate(js_code).await?;
        Ok(result.into_value()?)
    }
}

//! 从真实页面提取职位描述
//!
//! 一次脚本执行采集所有选择器的首个匹配文本，判定逻辑仍在 Rust 侧完成

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::extraction::heuristic::{CandidateSnapshot, ContentExtractionHeuristic, Extraction};
use crate::infrastructure::JsExecutor;

/// 生成采集脚本
///
/// 脚本整体包在 try/catch 里，任何异常返回 null
pub fn snapshot_script(selectors: &[&str]) -> String {
    let selectors_json =
        serde_json::to_string(selectors).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
    try {{
        const selectors = {selectors_json};
        const found = {{}};
        for (const selector of selectors) {{
            const el = document.querySelector(selector);
            if (el && typeof el.innerText === "string") {{
                found[selector] = el.innerText;
            }}
        }}
        return found;
    }} catch (e) {{
        return null;
    }}
}})()"#
    )
}

/// 把脚本返回值转成快照；null 或非对象视为脚本故障
pub fn snapshot_from_value(value: &JsonValue) -> CandidateSnapshot {
    let Some(object) = value.as_object() else {
        return CandidateSnapshot::faulted();
    };

    let matches: HashMap<String, String> = object
        .iter()
        .filter_map(|(selector, text)| text.as_str().map(|t| (selector.clone(), t.to_string())))
        .collect();
    CandidateSnapshot::from_matches(matches)
}

/// 对当前页面执行启发式提取
///
/// 页面脚本执行失败也归为 NotFound，不向上抛错
pub async fn extract_from_page(
    executor: &JsExecutor,
    heuristic: &ContentExtractionHeuristic,
) -> Extraction {
    let script = snapshot_script(&heuristic.selectors());

    let snapshot = match executor.eval(script).await {
        Ok(value) => snapshot_from_value(&value),
        Err(e) => {
            warn!("⚠️  页面脚本执行失败: {}", e);
            CandidateSnapshot::faulted()
        }
    };
    debug!("页面快照命中 {} 个选择器", snapshot.len());

    heuristic.extract(&snapshot)
}

//! 阶段响应的强类型结果
//!
//! 在边界处一次性解析，调用方不再自己翻 JSON

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// ATS 评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u32,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub formatting_check: Option<String>,
}

/// 模型给出的分数可能是整数、小数或数字字符串，统一四舍五入到 0..=100
fn deserialize_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    let value = match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => n,
        RawScore::Text(text) => text
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid score: {:?}", text)))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("score is not a finite number"));
    }
    Ok(value.round().clamp(0.0, 100.0) as u32)
}

/// 分数档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtsBand {
    Excellent,
    Good,
    NeedsWork,
}

impl AtsBand {
    pub fn label(&self) -> &'static str {
        match self {
            AtsBand::Excellent => "EXCELLENT",
            AtsBand::Good => "GOOD",
            AtsBand::NeedsWork => "NEEDS WORK",
        }
    }
}

impl AtsReport {
    pub fn band(&self) -> AtsBand {
        match self.score {
            s if s >= 80 => AtsBand::Excellent,
            s if s >= 70 => AtsBand::Good,
            _ => AtsBand::NeedsWork,
        }
    }
}

/// 被标记的 AI 腔短语
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedPhrase {
    pub phrase: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub suggestion: String,
}

/// AI 痕迹检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetectionReport {
    #[serde(deserialize_with = "deserialize_score")]
    pub human_score: u32,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub items: Vec<FlaggedPhrase>,
}

/// 渲染好的 PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// 后端最终使用的 YAML（仅简历渲染会返回）
    pub final_yaml: Option<String>,
}

impl RenderedDocument {
    /// 从 `{ "pdf_base64": ..., "final_yaml"?: ... }` 解析
    pub fn from_payload(payload: &JsonValue) -> Result<Self, String> {
        let encoded = payload
            .get("pdf_base64")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| "response is missing \"pdf_base64\"".to_string())?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("invalid base64 document: {}", e))?;

        Ok(Self {
            bytes,
            final_yaml: payload
                .get("final_yaml")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

/// 下载文件名，保证以 .pdf 结尾
pub fn pdf_file_name(name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { "Tailored_Resume" } else { name };
    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

//! 职位描述提取启发式
//!
//! 定位规则按优先级排列：先是各招聘网站的专用容器，再是通用的 description 类名 / id，
//! 最后是 article / main 这类大容器。逐条检查，每条只取文档顺序中的第一个匹配元素，
//! 去掉首尾空白后长度超过阈值才接受。先按规则顺序决出结果，长度只用来过滤

use std::collections::HashMap;

/// 默认最小长度（字符数，严格大于）
pub const MIN_DESCRIPTION_CHARS: usize = 100;

/// 一条定位规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRule {
    /// CSS 选择器
    pub selector: String,
    /// 便于日志阅读的来源说明
    pub source: &'static str,
    pub min_chars: usize,
}

impl LocatorRule {
    pub fn new(selector: impl Into<String>, source: &'static str) -> Self {
        Self {
            selector: selector.into(),
            source,
            min_chars: MIN_DESCRIPTION_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    fn accepts(&self, text: &str) -> bool {
        text.chars().count() > self.min_chars
    }
}

/// 默认规则，越具体越靠前
pub fn default_rules() -> Vec<LocatorRule> {
    vec![
        LocatorRule::new("#jobDescriptionText", "indeed"),
        LocatorRule::new(".jobs-description__content", "linkedin"),
        LocatorRule::new(".jobs-description-content__text", "linkedin"),
        LocatorRule::new(".show-more-less-html__markup", "linkedin"),
        LocatorRule::new("[class*='description']", "generic"),
        LocatorRule::new("[id*='description']", "generic"),
        LocatorRule::new("article", "structural"),
        LocatorRule::new("main", "structural"),
    ]
}

/// 文档探针：对一个选择器返回第一个匹配元素的文本
///
/// 返回 Err 表示文档本身出了问题（脚本异常、接口缺失），启发式会整体按"未找到"处理
pub trait DocumentProbe {
    fn first_text(&self, selector: &str) -> Result<Option<String>, ProbeFault>;
}

/// 探针内部故障
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFault(pub String);

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found { text: String, selector: String },
    NotFound,
}

impl Extraction {
    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Found { text, .. } => Some(text),
            Extraction::NotFound => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Extraction::Found { text, .. } => Some(text),
            Extraction::NotFound => None,
        }
    }
}

/// 内容提取启发式（无状态）
#[derive(Debug, Clone)]
pub struct ContentExtractionHeuristic {
    rules: Vec<LocatorRule>,
}

impl Default for ContentExtractionHeuristic {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ContentExtractionHeuristic {
    pub fn new(rules: Vec<LocatorRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LocatorRule] {
        &self.rules
    }

    pub fn selectors(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.selector.as_str()).collect()
    }

    /// 按优先级返回第一个合格文本
    pub fn extract(&self, document: &dyn DocumentProbe) -> Extraction {
        for rule in &self.rules {
            let text = match document.first_text(&rule.selector) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(ProbeFault(reason)) => {
                    tracing::debug!("文档探测异常，按未找到处理: {}", reason);
                    return Extraction::NotFound;
                }
            };

            let text = text.trim();
            if rule.accepts(text) {
                tracing::debug!("✓ 命中规则 {} ({})", rule.selector, rule.source);
                return Extraction::Found {
                    text: text.to_string(),
                    selector: rule.selector.clone(),
                };
            }
            tracing::debug!(
                "规则 {} 命中但文本过短 ({} 字符)，继续",
                rule.selector,
                text.chars().count()
            );
        }

        Extraction::NotFound
    }
}

/// 页面快照：选择器 → 第一个匹配元素的文本
///
/// 在页面沙箱里一次性采集，之后在这里同步判定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSnapshot {
    matches: HashMap<String, String>,
    faulted: bool,
}

impl CandidateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matches(matches: HashMap<String, String>) -> Self {
        Self {
            matches,
            faulted: false,
        }
    }

    /// 采集脚本自身出错时的快照
    pub fn faulted() -> Self {
        Self {
            matches: HashMap::new(),
            faulted: true,
        }
    }

    pub fn with(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.matches.insert(selector.into(), text.into());
        self
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl DocumentProbe for CandidateSnapshot {
    fn first_text(&self, selector: &str) -> Result<Option<String>, ProbeFault> {
        if self.faulted {
            return Err(ProbeFault("page script failed".to_string()));
        }
        Ok(self.matches.get(selector).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(len: usize) -> String {
        "a".repeat(len)
    }

    #[test]
    fn test_short_generic_article_is_not_found() {
        let doc = CandidateSnapshot::new().with("article", text_of(50));
        assert_eq!(ContentExtractionHeuristic::default().extract(&doc), Extraction::NotFound);
    }

    #[test]
    fn test_long_generic_article_is_found() {
        let doc = CandidateSnapshot::new().with("article", text_of(150));
        let result = ContentExtractionHeuristic::default().extract(&doc);
        assert_eq!(result.text(), Some(text_of(150).as_str()));
    }

    #[test]
    fn test_specific_locator_wins_over_longer_generic() {
        let specific = text_of(120);
        let generic = "b".repeat(200);
        let doc = CandidateSnapshot::new()
            .with("#jobDescriptionText", specific.clone())
            .with("article", generic);

        assert_eq!(
            ContentExtractionHeuristic::default().extract(&doc),
            Extraction::Found {
                text: specific,
                selector: "#jobDescriptionText".to_string()
            }
        );
    }

    #[test]
    fn test_threshold_is_strict_and_applies_after_trim() {
        let heuristic = ContentExtractionHeuristic::default();

        let exactly = CandidateSnapshot::new().with("main", text_of(100));
        assert_eq!(heuristic.extract(&exactly), Extraction::NotFound);

        let padded = CandidateSnapshot::new().with("main", format!("\n   {}   \n", text_of(101)));
        assert_eq!(heuristic.extract(&padded).text(), Some(text_of(101).as_str()));
    }

    #[test]
    fn test_short_specific_match_falls_through_to_next_rule() {
        let doc = CandidateSnapshot::new()
            .with(".jobs-description__content", "See more")
            .with("[class*='description']", text_of(300));

        let result = ContentExtractionHeuristic::default().extract(&doc);
        assert!(matches!(
            result,
            Extraction::Found { ref selector, .. } if selector == "[class*='description']"
        ));
    }

    #[test]
    fn test_faulted_document_is_not_found() {
        let doc = CandidateSnapshot::faulted();
        assert_eq!(ContentExtractionHeuristic::default().extract(&doc), Extraction::NotFound);
    }

    #[test]
    fn test_threshold_counts_characters_not_bytes() {
        // 60 个汉字 = 180 字节，但只有 60 个字符
        let doc = CandidateSnapshot::new().with("article", "职".repeat(60));
        assert_eq!(ContentExtractionHeuristic::default().extract(&doc), Extraction::NotFound);
    }

    #[test]
    fn test_custom_rules_and_threshold() {
        let heuristic = ContentExtractionHeuristic::new(vec![
            LocatorRule::new(".posting", "custom").with_min_chars(10),
        ]);
        let doc = CandidateSnapshot::new().with(".posting", "Senior Rust role");
        assert_eq!(heuristic.extract(&doc).text(), Some("Senior Rust role"));
        assert_eq!(heuristic.selectors(), vec![".posting"]);
    }
}

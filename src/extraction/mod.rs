//! 职位描述提取
//!
//! - `heuristic` - 纯判定逻辑（规则 + 探针）
//! - `page` - 真实浏览器页面上的采集

pub mod heuristic;
pub mod page;

pub use heuristic::{
    default_rules, CandidateSnapshot, ContentExtractionHeuristic, DocumentProbe, Extraction,
    LocatorRule, ProbeFault, MIN_DESCRIPTION_CHARS,
};
pub use page::extract_from_page;

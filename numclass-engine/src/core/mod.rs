mod range;
mod result;
mod rule;

// 导出常用项
pub use range::AnalysisRange;
pub use result::ClassificationResult;
pub use rule::{CompiledRule, Predicate, RuleKind};

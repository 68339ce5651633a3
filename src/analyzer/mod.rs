//! 分析模块：整合配置加载、规则编译与区间分类
mod analyzer;

pub use self::analyzer::NumberAnalyzer;

//! 规则模块：负责规则配置文件的定位与加载
pub mod loader;

// 导出核心接口
pub use self::loader::RuleLoader;

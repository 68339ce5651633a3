//! numclass - 基于配置规则的整数区间分类工具
//!
//! 规则配置文件（JSON）声明有序的「标签 + 规则」列表，规则可以是内置谓词
//! （prime / even / odd）、单参数 lambda 表达式或单参数 def 函数定义。
//! [`NumberAnalyzer`] 在构造时完成配置加载、规则编译与区间分类。
//!
//! 规则源码由受限解释器执行：仅支持对唯一整数参数的算术、比较与布尔运算，
//! 没有 I/O 与全局状态，这是相对任意代码执行的有意裁剪。
//! 编译期会以 10 为样本调用每条规则做校验，规则作者需对其规则代码负责。

// 导出全局错误类型
pub use self::error::{AnalysisError, AnalysisResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出规则模块核心接口
pub use self::rule::RuleLoader;

// 导出分析模块核心接口
pub use self::analyzer::NumberAnalyzer;

// 导出工具模块核心接口
pub use self::utils::ResultPrinter;

// 引擎层常用类型
pub use numclass_engine::{
    AnalysisRange, BigInt, ClassificationResult, CompiledRule, RuleRegistry, RuleSpec,
};

// 声明所有子模块
pub mod analyzer;
pub mod config;
pub mod error;
pub mod rule;
pub mod utils;

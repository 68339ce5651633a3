//! numclass-engine - 整数分类规则编译与求值引擎
//!
//! 规则以「标签 + 源码」形式声明，源码为内置名（prime / even / odd）、
//! 单参数 lambda 表达式或单参数 def 函数定义，统一编译为整数谓词后按声明顺序对区间求值。
//!
//! lambda 规则允许外层包裹括号；表达式嵌套、if 嵌套与求值深度均有上限，
//! 超限的规则在编译期报错，不会耗尽调用栈。

// 区间、编译后规则、分类结果等核心结构
pub mod core;
// 规则编译（内置分派 + lambda/def 编译 + 样本校验）
pub mod compiler;
// 受限规则语言：词法/语法/解释执行
pub mod expr;
// 有序规则注册表
pub mod registry;
// 分类引擎
pub mod classifier;
// 规则源解析（categories JSON）
pub mod source;
// 错误定义
pub mod error;
// 通用工具
pub mod utils;

// 顶层导出常用类型
pub use classifier::{ClassificationEngine, LABEL_SEPARATOR};
pub use compiler::{BuiltinRule, CompileOptions, RuleCompiler, SAMPLE_VALUE};
pub use core::{AnalysisRange, ClassificationResult, CompiledRule, Predicate, RuleKind};
pub use error::{AnalysisError, AnalysisResult};
pub use registry::RuleRegistry;
pub use source::{ParsedConfig, RuleDocument, RuleSourceParser, RuleSpec};

// 任意精度整数类型，调用方无需单独依赖 num-bigint
pub use num_bigint::BigInt;

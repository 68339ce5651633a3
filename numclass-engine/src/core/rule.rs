//! 编译后规则模型
//! CompiledRule 在编译期创建，之后不可变，由 RuleRegistry 独占持有
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::compiler::BuiltinRule;
use crate::expr::{call_function, call_lambda, EvalError, FunctionDef, Lambda};

/// 规则来源类型（用于日志统计与调试输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Builtin,
    Lambda,
    Function,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Builtin => "builtin",
            Self::Lambda => "lambda",
            Self::Function => "def",
        };
        f.write_str(name)
    }
}

/// 可执行整数谓词
/// 语法树以 Arc 共享，克隆代价恒定，可跨线程并行求值
#[derive(Debug, Clone)]
pub enum Predicate {
    Builtin(BuiltinRule),
    Lambda(Arc<Lambda>),
    Function(Arc<FunctionDef>),
}

impl Predicate {
    /// 对单个整数求值，返回值按真值规则折算为 bool
    pub fn test(&self, number: &BigInt) -> Result<bool, EvalError> {
        match self {
            Self::Builtin(rule) => Ok(rule.test(number)),
            Self::Lambda(lambda) => call_lambda(lambda, number).map(|v| v.truthy()),
            Self::Function(function) => call_function(function, number).map(|v| v.truthy()),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Builtin(_) => RuleKind::Builtin,
            Self::Lambda(_) => RuleKind::Lambda,
            Self::Function(_) => RuleKind::Function,
        }
    }
}

/// 编译后的规则（标签 + 谓词）
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub label: String,
    pub predicate: Predicate,
}

impl CompiledRule {
    pub fn new(label: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            label: label.into(),
            predicate,
        }
    }

    #[inline]
    pub fn kind(&self) -> RuleKind {
        self.predicate.kind()
    }

    #[inline]
    pub fn matches(&self, number: &BigInt) -> Result<bool, EvalError> {
        self.predicate.test(number)
    }
}

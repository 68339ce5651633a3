//! 受限规则语言：替代任意代码执行的 lambda / def 规则解释器
//!
//! 规则源码只能对唯一的整数参数做算术、比较、取模与布尔运算；
//! def 规则额外支持 if/elif/else、局部赋值、return 以及有限深度的自递归。
//! 不提供 I/O、导入、属性访问等能力，这是相对任意代码执行的有意裁剪。
pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use ast::{FunctionDef, Lambda};
pub use eval::{call_function, call_lambda, EvalError, Value};
pub use parser::{parse_function, parse_lambda};

/// 语法错误（行列均从1开始，相对规则源码）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid syntax: {message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

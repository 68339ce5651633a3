//! 编译模块：将规则定义编译为可执行的整数谓词
pub mod builtin;
pub mod compiler;

pub use self::builtin::BuiltinRule;
pub use self::compiler::{extract_function_name, CompileOptions, RuleCompiler, SAMPLE_VALUE};

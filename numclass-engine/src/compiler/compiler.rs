//! 规则编译器核心
//! 将规则定义（标签 + 源码）编译为可调用的整数谓词，并通过样本调用做即时校验
//!
//! 样本调用会执行配置作者提供的规则代码，与宿主进程同权限运行；
//! 规则语言本身已裁剪为无 I/O、无全局状态的受限子集，递归深度有上限。

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace, warn};
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;

use super::builtin::BuiltinRule;
use crate::core::{CompiledRule, Predicate, RuleKind};
use crate::error::{AnalysisError, AnalysisResult};
use crate::expr::{call_function, call_lambda, parse_function, parse_lambda, ParseError};
use crate::registry::RuleRegistry;
use crate::source::RuleSpec;
use crate::utils::preview::preview_compact;

/// 样本调用使用的固定样本值
pub const SAMPLE_VALUE: i64 = 10;

/// 日志中规则源码预览的最大长度
const PREVIEW_LEN: usize = 60;

/// 编译选项
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// 无法识别的规则源码是否视为编译错误（默认跳过并告警）
    pub strict_unknown: bool,
}

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 按声明顺序编译全部规则，构建注册表
    pub fn compile_all(specs: &[RuleSpec], options: &CompileOptions) -> AnalysisResult<RuleRegistry> {
        let start = Instant::now();
        let mut registry = RuleRegistry::new();
        let mut stats = CompileStats::default();

        for spec in specs {
            match Self::compile(spec, options)? {
                Some(rule) => {
                    stats.record(rule.kind());
                    registry.insert(rule);
                }
                None => stats.skipped += 1,
            }
        }

        debug!("✅ 规则编译完成，总耗时{:?}，注册表规则数{}", start.elapsed(), registry.len());
        debug!(
            "📊 编译统计：内置{}条、lambda{}条、def{}条、跳过{}条",
            stats.builtin_count, stats.lambda_count, stats.function_count, stats.skipped
        );

        Ok(registry)
    }

    /// 编译单条规则
    /// 返回 Ok(None) 表示规则源码无法识别且未启用严格模式
    pub fn compile(spec: &RuleSpec, options: &CompileOptions) -> AnalysisResult<Option<CompiledRule>> {
        let source = spec.rule.as_str();
        trace!("编译规则 [{}]：{}", spec.label, preview_compact(source, PREVIEW_LEN));

        // 1. 内置规则（精确匹配）
        if let Some(builtin) = BuiltinRule::from_source(source) {
            trace!("标签 [{}] 使用内置谓词 {}", spec.label, builtin.name());
            return Ok(Some(CompiledRule::new(&spec.label, Predicate::Builtin(builtin))));
        }

        // 2. lambda 表达式
        if source.contains("lambda") {
            return Self::compile_lambda(&spec.label, source).map(Some);
        }

        // 3. def 函数定义
        if source.contains("def") {
            return Self::compile_function(&spec.label, source).map(Some);
        }

        // 4. 无法识别
        if options.strict_unknown {
            return Err(AnalysisError::compilation(
                &spec.label,
                format!("unrecognized rule '{}'", preview_compact(source, PREVIEW_LEN)),
            ));
        }
        warn!(
            "标签 [{}] 的规则无法识别，已跳过：{}",
            spec.label,
            preview_compact(source, PREVIEW_LEN)
        );
        Ok(None)
    }

    fn compile_lambda(label: &str, source: &str) -> AnalysisResult<CompiledRule> {
        let lambda = parse_lambda(source).map_err(|e| AnalysisError::compilation(label, e))?;

        // 样本调用：构造期即暴露规则错误
        call_lambda(&lambda, &BigInt::from(SAMPLE_VALUE))
            .map_err(|e| AnalysisError::compilation(label, e))?;

        Ok(CompiledRule::new(label, Predicate::Lambda(Arc::new(lambda))))
    }

    fn compile_function(label: &str, source: &str) -> AnalysisResult<CompiledRule> {
        // 1. 提取函数名
        let name = extract_function_name(source).ok_or_else(|| {
            AnalysisError::compilation(label, ParseError::new("expected a function definition", 1, 1))
        })?;

        // 2. 解析函数定义，且声明的函数必须是提取出的函数名
        let function = parse_function(source).map_err(|e| AnalysisError::compilation(label, e))?;
        if function.name != name {
            return Err(AnalysisError::compilation(
                label,
                format!("name '{}' is not defined", name),
            ));
        }

        // 3. 样本调用
        call_function(&function, &BigInt::from(SAMPLE_VALUE))
            .map_err(|e| AnalysisError::compilation(label, e))?;

        Ok(CompiledRule::new(label, Predicate::Function(Arc::new(function))))
    }
}

/// 从 def 源码中提取声明的函数名
pub fn extract_function_name(source: &str) -> Option<&str> {
    static DEF_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"def\s+([a-zA-Z_][a-zA-Z_0-9]*)\s*\(").unwrap()
    });

    DEF_NAME_REGEX
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    builtin_count: usize,
    lambda_count: usize,
    function_count: usize,
    skipped: usize,
}

impl CompileStats {
    fn record(&mut self, kind: RuleKind) {
        match kind {
            RuleKind::Builtin => self.builtin_count += 1,
            RuleKind::Lambda => self.lambda_count += 1,
            RuleKind::Function => self.function_count += 1,
        }
    }
}

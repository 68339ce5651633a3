//! 分类引擎：对区间内每个整数按注册表顺序依次求值所有谓词，拼接命中标签
//! 每个整数的分类互不依赖；开启 parallel 特性时并行求值，结果仍按整数升序排列
use std::time::Instant;

use log::debug;
use num_bigint::BigInt;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{AnalysisRange, ClassificationResult};
use crate::error::{AnalysisError, AnalysisResult};
use crate::registry::RuleRegistry;

/// 标签分隔符
pub const LABEL_SEPARATOR: &str = ", ";

/// 分类引擎
pub struct ClassificationEngine;

impl ClassificationEngine {
    /// 对整个区间分类，生成顺序视图与按整数索引视图
    pub fn classify(range: &AnalysisRange, registry: &RuleRegistry) -> AnalysisResult<ClassificationResult> {
        let start = Instant::now();
        let len = range.len()?;

        let labelled = Self::classify_all(range, len, registry)?;

        let mut result = ClassificationResult::with_capacity(len);
        for (number, labels) in labelled {
            result.push(number, labels);
        }

        debug!(
            "✅ 分类完成：区间[{}, {}]共{}个整数、{}条规则，耗时{:?}",
            range.start(),
            range.end(),
            len,
            registry.len(),
            start.elapsed()
        );

        Ok(result)
    }

    /// 对单个整数分类，返回按注册表顺序拼接的标签串（无命中为空串）
    pub fn classify_number(number: &BigInt, registry: &RuleRegistry) -> AnalysisResult<String> {
        let mut matched: Vec<&str> = Vec::new();
        for rule in registry {
            let hit = rule.matches(number).map_err(|e| AnalysisError::RuleEvaluationFailed {
                label: rule.label.clone(),
                number: number.clone(),
                detail: e.to_string(),
            })?;
            if hit {
                matched.push(&rule.label);
            }
        }
        Ok(matched.join(LABEL_SEPARATOR))
    }

    #[cfg(not(feature = "parallel"))]
    fn classify_all(
        range: &AnalysisRange,
        len: usize,
        registry: &RuleRegistry,
    ) -> AnalysisResult<Vec<(BigInt, String)>> {
        let mut labelled = Vec::with_capacity(len);
        for number in range.iter() {
            let labels = Self::classify_number(&number, registry)?;
            labelled.push((number, labels));
        }
        Ok(labelled)
    }

    #[cfg(feature = "parallel")]
    fn classify_all(
        range: &AnalysisRange,
        len: usize,
        registry: &RuleRegistry,
    ) -> AnalysisResult<Vec<(BigInt, String)>> {
        // 按下标并行，collect 保持下标顺序
        (0..len)
            .into_par_iter()
            .map(|offset| {
                let number = range.start() + BigInt::from(offset);
                let labels = Self::classify_number(&number, registry)?;
                Ok((number, labels))
            })
            .collect()
    }
}

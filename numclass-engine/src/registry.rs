//! 规则注册表：标签 -> 编译后规则的有序映射
//! 插入顺序即分类求值顺序；标签重复时保留首次出现的位置、替换为后出现的谓词
use log::warn;
use num_bigint::BigInt;
use rustc_hash::FxHashMap;

use crate::core::CompiledRule;
use crate::error::{AnalysisError, AnalysisResult};

/// 有序规则注册表
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<CompiledRule>,
    // 标签 -> rules 下标
    index: FxHashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入规则；标签已存在时原位替换，返回被替换的旧规则
    pub fn insert(&mut self, rule: CompiledRule) -> Option<CompiledRule> {
        if let Some(&slot) = self.index.get(&rule.label) {
            warn!(
                "标签 [{}] 重复定义，沿用首次出现的位置 #{}，谓词替换为后定义的规则",
                rule.label, slot
            );
            return Some(std::mem::replace(&mut self.rules[slot], rule));
        }

        self.index.insert(rule.label.clone(), self.rules.len());
        self.rules.push(rule);
        None
    }

    pub fn get(&self, label: &str) -> Option<&CompiledRule> {
        self.index.get(label).map(|&slot| &self.rules[slot])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// 直接调用某个标签对应的谓词，标签不存在返回 None
    pub fn evaluate(&self, label: &str, number: &BigInt) -> Option<AnalysisResult<bool>> {
        let rule = self.get(label)?;
        Some(rule.matches(number).map_err(|e| AnalysisError::RuleEvaluationFailed {
            label: rule.label.clone(),
            number: number.clone(),
            detail: e.to_string(),
        }))
    }

    /// 按求值顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleRegistry {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

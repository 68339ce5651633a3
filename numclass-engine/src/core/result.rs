//! 分类结果：同一次计算的两种同步视图
use std::collections::BTreeMap;

use num_bigint::BigInt;

/// 分类结果
/// - ordered[i] 对应 start + i
/// - by_number 按整数升序存放，供查找与调试视图遍历
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationResult {
    ordered: Vec<String>,
    by_number: BTreeMap<BigInt, String>,
}

impl ClassificationResult {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            ordered: Vec::with_capacity(capacity),
            by_number: BTreeMap::new(),
        }
    }

    /// 追加一个整数的标签串（调用方保证升序）
    pub(crate) fn push(&mut self, number: BigInt, labels: String) {
        self.ordered.push(labels.clone());
        self.by_number.insert(number, labels);
    }

    pub fn ordered(&self) -> &[String] {
        &self.ordered
    }

    pub fn by_number(&self) -> &BTreeMap<BigInt, String> {
        &self.by_number
    }

    pub fn get(&self, number: &BigInt) -> Option<&str> {
        self.by_number.get(number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

//! 分析区间 [start, end]（闭区间，任意精度）
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};

use crate::error::{AnalysisError, AnalysisResult};

/// 分析区间，构造即保证 start <= end
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisRange {
    start: BigInt,
    end: BigInt,
}

impl AnalysisRange {
    pub fn new(start: impl Into<BigInt>, end: impl Into<BigInt>) -> AnalysisResult<Self> {
        let (start, end) = (start.into(), end.into());
        if start > end {
            return Err(AnalysisError::InvalidRange("start must be smaller than end".to_string()));
        }
        Ok(Self { start, end })
    }

    /// 从十进制文本解析区间（两端允许前后空白与正负号）
    pub fn parse(start: &str, end: &str) -> AnalysisResult<Self> {
        let parse = |text: &str| {
            text.trim().parse::<BigInt>().map_err(|_| {
                AnalysisError::InvalidRange("start and end must be integers".to_string())
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn start(&self) -> &BigInt {
        &self.start
    }

    pub fn end(&self) -> &BigInt {
        &self.end
    }

    /// 区间内整数个数 end - start + 1；超出 usize 视为区间过大
    pub fn len(&self) -> AnalysisResult<usize> {
        let count: BigInt = &self.end - &self.start + BigInt::one();
        count
            .to_usize()
            .ok_or_else(|| AnalysisError::InvalidRange("range is too large".to_string()))
    }

    /// 升序遍历区间内所有整数
    pub fn iter(&self) -> impl Iterator<Item = BigInt> + '_ {
        let mut current = self.start.clone();
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let value = current.clone();
            if current >= self.end {
                done = true;
            } else {
                current += 1u8;
            }
            Some(value)
        })
    }
}

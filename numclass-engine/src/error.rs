//! numclass-engine 错误定义
//! 构造期（区间校验/配置解析/规则编译/分类）所有错误统一收敛到 AnalysisError
//! Display 文本属于对外契约，调用方与测试依赖其字符串匹配，修改需谨慎
use num_bigint::BigInt;
use thiserror::Error;

/// 分析错误枚举
/// 所有错误均在构造阶段抛出，构造失败即不产生任何结果
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    // ===================== 参数相关错误 =====================
    /// 区间非法（非整数 / start > end / 区间过大）
    #[error("{0}")]
    InvalidRange(String),

    // ===================== 配置相关错误 =====================
    /// 配置根目录或配置文件不存在
    #[error("{0}")]
    ConfigurationUnavailable(String),

    /// 配置文件存在但解析失败（原样携带解析器诊断信息）
    #[error("config file could not be read: {0}")]
    ConfigurationMalformed(String),

    // ===================== 规则相关错误 =====================
    /// 规则编译失败（语法错误 / 样本调用失败）
    #[error("error in rule for label {label}: {detail}")]
    RuleCompilationFailed { label: String, detail: String },

    /// 分类阶段规则求值失败（样本调用通过但其他输入触发运行时错误）
    #[error("error evaluating rule for label {label} at {number}: {detail}")]
    RuleEvaluationFailed {
        label: String,
        number: BigInt,
        detail: String,
    },
}

impl AnalysisError {
    /// 构造规则编译错误（携带标签与底层诊断原文）
    pub fn compilation(label: impl Into<String>, detail: impl ToString) -> Self {
        Self::RuleCompilationFailed {
            label: label.into(),
            detail: detail.to_string(),
        }
    }
}

/// 引擎层全局Result类型别名
pub type AnalysisResult<T> = Result<T, AnalysisError>;

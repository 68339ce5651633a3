//! 全局错误类型定义
//! 错误枚举定义在引擎层，应用层直接复用，保证错误文本一致

pub use numclass_engine::error::{AnalysisError, AnalysisResult};

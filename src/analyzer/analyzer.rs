//! 整数区间分析器
//! 构造即完成全部流程：配置定位 -> 区间校验 -> 配置加载 -> 规则编译 -> 区间分类
//! 任一步失败即返回错误，不存在部分构造的分析器

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::debug;
use numclass_engine::{
    AnalysisRange, AnalysisResult, BigInt, ClassificationEngine, ClassificationResult,
    ParsedConfig, RuleCompiler, RuleRegistry,
};
use serde_json::Value;

use crate::config::{ConfigManager, GlobalConfig};
use crate::rule::RuleLoader;
use crate::utils::ResultPrinter;

/// 整数区间分析器
#[derive(Debug, Clone)]
pub struct NumberAnalyzer {
    range: AnalysisRange,
    config_file: PathBuf,
    config: ParsedConfig,
    rules: RuleRegistry,
    classification: ClassificationResult,
}

impl NumberAnalyzer {
    /// 使用默认全局配置构造
    pub fn new(
        start: impl Into<BigInt>,
        end: impl Into<BigInt>,
        config_file: impl AsRef<Path>,
    ) -> AnalysisResult<Self> {
        Self::with_config(start, end, config_file, &ConfigManager::get_default())
    }

    /// 使用自定义全局配置构造
    pub fn with_config(
        start: impl Into<BigInt>,
        end: impl Into<BigInt>,
        config_file: impl AsRef<Path>,
        config: &GlobalConfig,
    ) -> AnalysisResult<Self> {
        let (start, end) = (start.into(), end.into());
        Self::build(|| AnalysisRange::new(start, end), config_file.as_ref(), config)
    }

    /// 从十进制文本构造（交互输入、命令行参数）
    pub fn from_strs(
        start: &str,
        end: &str,
        config_file: impl AsRef<Path>,
        config: &GlobalConfig,
    ) -> AnalysisResult<Self> {
        Self::build(|| AnalysisRange::parse(start, end), config_file.as_ref(), config)
    }

    fn build(
        range: impl FnOnce() -> AnalysisResult<AnalysisRange>,
        config_file: &Path,
        config: &GlobalConfig,
    ) -> AnalysisResult<Self> {
        let start = Instant::now();

        // 1. 配置根目录必须存在（先于区间校验）
        let root = RuleLoader::config_root(config)?;

        // 2. 区间校验
        let range = range()?;

        // 3. 定位并加载配置
        let config_file = RuleLoader::resolve(&root, config_file)?;
        let parsed = RuleLoader::load(&config_file)?;

        // 4. 编译规则
        let rules = RuleCompiler::compile_all(parsed.specs(), &config.compile_options())?;

        // 5. 区间分类
        let classification = ClassificationEngine::classify(&range, &rules)?;

        debug!(
            "✅ 分析器构建完成，配置文件：{}，规则数：{}，总耗时{:?}",
            config_file.display(),
            rules.len(),
            start.elapsed()
        );

        Ok(Self {
            range,
            config_file,
            config: parsed,
            rules,
            classification,
        })
    }

    pub fn start(&self) -> &BigInt {
        self.range.start()
    }

    pub fn end(&self) -> &BigInt {
        self.range.end()
    }

    pub fn range(&self) -> &AnalysisRange {
        &self.range
    }

    /// 解析后的配置文件路径
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// 原样保留的配置文档
    pub fn config(&self) -> &Value {
        &self.config.raw
    }

    /// 编译后的规则注册表，可直接调用单个谓词
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// 顺序视图：第 i 项对应 start + i
    pub fn results(&self) -> &[String] {
        self.classification.ordered()
    }

    /// 按整数索引视图
    pub fn results_debug(&self) -> &BTreeMap<BigInt, String> {
        self.classification.by_number()
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    /// 输出到标准输出；debug 为 true 时带整数前缀
    pub fn print_results(&self, debug: bool) -> io::Result<()> {
        ResultPrinter::print(&self.classification, debug)
    }

    pub fn render(&self, debug: bool) -> String {
        ResultPrinter::render(&self.classification, debug)
    }
}

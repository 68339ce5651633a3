//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

use numclass_engine::CompileOptions;

/// 默认配置根目录（相对当前工作目录）
pub const DEFAULT_CONFIG_DIR: &str = "config";
/// 默认规则配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "default.json";

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 配置根目录，不含目录部分的配置文件名在此目录下查找
    pub config_dir: PathBuf,
    // 未指定配置文件时使用的文件名
    pub default_config_file: String,
    // 无法识别的规则是否视为错误（默认跳过并告警）
    pub strict_rules: bool,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            default_config_file: DEFAULT_CONFIG_FILE.to_string(),
            strict_rules: false,
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 转换为引擎编译选项
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            strict_unknown: self.strict_rules,
        }
    }

    /// 未设置 RUST_LOG 时的默认日志级别
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// 配置管理器（单例）
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config_dir = dir.into();
        self
    }

    pub fn default_config_file(mut self, file: impl Into<String>) -> Self {
        self.config.default_config_file = file.into();
        self
    }

    pub fn strict_rules(mut self, strict: bool) -> Self {
        self.config.strict_rules = strict;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigManager::get_default();
        assert_eq!(config.config_dir, PathBuf::from("config"));
        assert_eq!(config.default_config_file, "default.json");
        assert!(!config.strict_rules);
        assert!(!config.compile_options().strict_unknown);
        assert_eq!(config.default_log_level(), "warn");
    }

    #[test]
    fn test_custom_builder() {
        let config = ConfigManager::custom()
            .config_dir("/tmp/rules")
            .default_config_file("extra.json")
            .strict_rules(true)
            .verbose(true)
            .build();

        assert_eq!(config.config_dir, PathBuf::from("/tmp/rules"));
        assert_eq!(config.default_config_file, "extra.json");
        assert!(config.compile_options().strict_unknown);
        assert_eq!(config.default_log_level(), "debug");
    }
}

//! 规则加载管理器
//! 负责定位配置根目录与规则配置文件，并读取解析为规则定义序列

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use numclass_engine::{AnalysisError, AnalysisResult, ParsedConfig, RuleSourceParser};

use crate::config::GlobalConfig;

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 定位配置根目录（相对路径按当前工作目录解析），目录不存在即报错
    pub fn config_root(config: &GlobalConfig) -> AnalysisResult<PathBuf> {
        let root = if config.config_dir.is_absolute() {
            config.config_dir.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&config.config_dir))
                .unwrap_or_else(|_| config.config_dir.clone())
        };

        if !root.is_dir() {
            return Err(AnalysisError::ConfigurationUnavailable(
                "config directory does not exist".to_string(),
            ));
        }
        Ok(root)
    }

    /// 解析配置文件路径：不含目录部分的文件名拼接到配置根目录下，最终路径必须是文件
    pub fn resolve(root: &Path, config_file: impl AsRef<Path>) -> AnalysisResult<PathBuf> {
        let config_file = config_file.as_ref();
        let has_dir = config_file
            .parent()
            .is_some_and(|parent| !parent.as_os_str().is_empty());

        let path = if has_dir {
            config_file.to_path_buf()
        } else {
            root.join(config_file)
        };

        if !path.is_file() {
            return Err(config_not_found());
        }
        debug!("规则配置文件：{}", path.display());
        Ok(path)
    }

    /// 读取并解析配置文件
    pub fn load(path: &Path) -> AnalysisResult<ParsedConfig> {
        let bytes = fs::read(path).map_err(|e| {
            debug!("读取规则配置文件失败：{} - {}", path.display(), e);
            config_not_found()
        })?;

        let parsed = RuleSourceParser::new().parse_from_bytes(&bytes)?;
        debug!(
            "规则配置加载成功：{}，规则定义数：{}",
            path.display(),
            parsed.specs().len()
        );
        Ok(parsed)
    }

    /// 一步完成：定位根目录 -> 解析路径 -> 读取解析
    pub fn load_from_config(
        config: &GlobalConfig,
        config_file: impl AsRef<Path>,
    ) -> AnalysisResult<(PathBuf, ParsedConfig)> {
        let root = Self::config_root(config)?;
        let path = Self::resolve(&root, config_file)?;
        let parsed = Self::load(&path)?;
        Ok((path, parsed))
    }
}

fn config_not_found() -> AnalysisError {
    AnalysisError::ConfigurationUnavailable("config file not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_missing_config_dir() {
        let dir = tempdir().unwrap();
        let config = ConfigManager::custom().config_dir(dir.path().join("absent")).build();
        let err = RuleLoader::config_root(&config).unwrap_err();
        assert_eq!(err.to_string(), "config directory does not exist");
    }

    #[test]
    fn test_bare_file_name_joined_onto_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rules.json"), r#"{"categories": []}"#).unwrap();

        let path = RuleLoader::resolve(dir.path(), "rules.json").unwrap();
        assert_eq!(path, dir.path().join("rules.json"));
    }

    #[test]
    fn test_path_with_dir_is_used_as_is() {
        let dir = tempdir().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"categories": []}"#).unwrap();

        let path = RuleLoader::resolve(dir.path(), file.path()).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let err = RuleLoader::resolve(dir.path(), "/nonexistent/config.json").unwrap_err();
        assert_eq!(err.to_string(), "config file not found");

        let err = RuleLoader::resolve(dir.path(), "missing.json").unwrap_err();
        assert_eq!(err, AnalysisError::ConfigurationUnavailable("config file not found".into()));
    }

    #[test]
    fn test_directory_is_not_a_config_file() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        assert!(RuleLoader::resolve(dir.path(), "nested").is_err());
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"categories": [{"label": "Even","rule"= "even"}]}"#).unwrap();

        let err = RuleLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigurationMalformed(_)));
        assert!(err.to_string().starts_with("config file could not be read: expected `:`"));
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempdir().unwrap();
        let content = serde_json::json!({"categories": [{"label": "Odd", "rule": "odd"}]});
        fs::write(dir.path().join("odd.json"), content.to_string()).unwrap();
        let config = ConfigManager::custom().config_dir(dir.path()).build();

        let (path, parsed) = RuleLoader::load_from_config(&config, "odd.json").unwrap();
        assert_eq!(path, dir.path().join("odd.json"));
        assert_eq!(parsed.raw, content);
        assert_eq!(parsed.specs()[0].label, "Odd");
    }
}

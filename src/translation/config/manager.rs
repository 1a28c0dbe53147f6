//! 配置管理器
//!
//! 默认值 -> 配置文件 -> 环境变量，后者覆盖前者

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 本地化配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalizeConfig {
    /// 源语言
    pub source_locale: String,
    /// 外键递归深度上限
    pub max_related_depth: usize,
    /// 完整性级联深度上限
    pub max_cascade_depth: usize,
    /// 同步时未翻译的字符串是否回退到源文本
    pub fallback_to_source: bool,
}

impl Default for LocalizeConfig {
    fn default() -> Self {
        Self {
            source_locale: constants::DEFAULT_SOURCE_LOCALE.to_string(),
            max_related_depth: constants::DEFAULT_MAX_RELATED_DEPTH,
            max_cascade_depth: constants::DEFAULT_MAX_CASCADE_DEPTH,
            fallback_to_source: false,
        }
    }
}

impl LocalizeConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.source_locale.trim().is_empty() {
            return Err(TranslationError::ConfigError("源语言不能为空".to_string()));
        }

        if self.max_cascade_depth == 0 {
            return Err(TranslationError::ConfigError(
                "级联深度上限不能为0".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: LocalizeConfig,
    config_path: Option<String>,
}

impl ConfigManager {
    /// 按搜索路径加载配置
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let config_path = constants::CONFIG_PATHS.iter().find_map(|path| {
            let expanded_path = shellexpand::tilde(path);
            Path::new(expanded_path.as_ref())
                .exists()
                .then(|| expanded_path.to_string())
        });

        Self::build(config_path)
    }

    /// 从指定文件加载配置，环境变量仍然生效
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path).to_string();
        if !Path::new(&expanded_path).exists() {
            return Err(TranslationError::ConfigError(format!(
                "配置文件不存在: {}",
                expanded_path
            )));
        }

        Self::build(Some(expanded_path))
    }

    fn build(config_path: Option<String>) -> TranslationResult<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&LocalizeConfig::default())
                .map_err(|e| TranslationError::ConfigError(format!("默认配置错误: {}", e)))?,
        );

        match &config_path {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path);
                builder = builder.add_source(File::with_name(path));
            }
            None => tracing::info!("未找到配置文件，使用默认配置"),
        }

        builder = builder.add_source(
            Environment::with_prefix(constants::ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: LocalizeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!("加载的配置: {:?}", config);

        Ok(Self {
            config,
            config_path,
        })
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 获取配置
    pub fn get_config(&self) -> &LocalizeConfig {
        &self.config
    }

    /// 实际使用的配置文件
    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let content = toml::to_string_pretty(&LocalizeConfig::default())?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        tracing::info!("已生成示例配置文件: {}", path);
        Ok(())
    }
}

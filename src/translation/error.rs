//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误分类。核心流程本身从不重试，
//! `is_retryable` 只是给调用方（后台任务等）的提示。

use thiserror::Error;

/// 干净字符串的结构违规
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    /// 出现了白名单之外的标签
    #[error("不允许的标签: <{tag}>")]
    DisallowedTag { tag: String },

    /// 标签携带了不允许的属性
    #[error("标签 <{tag}> 不允许携带属性 '{attribute}'")]
    DisallowedAttribute { tag: String, attribute: String },
}

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 字符串违反行内标签白名单
    #[error("结构违规: {0}")]
    StructuralViolation(#[from] StructuralViolation),

    /// 遇到没有提取/回填规则的块类型
    #[error("不支持的块类型: {0}")]
    UnsupportedBlockType(String),

    /// 模板引用了不存在的片段
    #[error("模板引用了不存在的片段: position={0}")]
    MissingFragment(usize),

    /// 模板占位符格式错误
    #[error("模板无效: {0}")]
    InvalidTemplate(String),

    /// 字段值与字段定义不匹配
    #[error("字段 '{path}' 的值无效，期望 {expected}")]
    InvalidFieldValue { path: String, expected: &'static str },

    /// 块数据与块定义不匹配
    #[error("块 '{block_type}' 的值无效，期望 {expected}")]
    InvalidBlockValue {
        block_type: String,
        expected: &'static str,
    },

    /// 注册表中没有该内容类型
    #[error("未注册的内容类型: {0}")]
    UnknownContentType(String),

    /// 仍有字符串没有译文
    #[error("还有 {missing} 个字符串未翻译")]
    IncompleteTranslation { missing: usize },

    /// 翻译器错误
    #[error("翻译服务错误: {0}")]
    TranslatorError(String),

    /// 翻译器不支持该语言对
    #[error("翻译器 {translator} 不支持 {source_locale} -> {target_locale}")]
    UnsupportedLanguagePair {
        translator: String,
        source_locale: String,
        target_locale: String,
    },

    /// 存储协作方错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 读写文件失败
    #[error("IO错误: {0}")]
    IoError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::TranslatorError(_) => true,
            TranslationError::StorageError(_) => true,
            TranslationError::IncompleteTranslation { .. } => true,
            TranslationError::StructuralViolation(_)
            | TranslationError::UnsupportedBlockType(_)
            | TranslationError::UnsupportedLanguagePair { .. }
            | TranslationError::MissingFragment(_)
            | TranslationError::InvalidTemplate(_)
            | TranslationError::InvalidFieldValue { .. }
            | TranslationError::InvalidBlockValue { .. }
            | TranslationError::UnknownContentType(_)
            | TranslationError::ConfigError(_)
            | TranslationError::SerializationError(_)
            | TranslationError::IoError(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::StructuralViolation(_) => ErrorCategory::Input,
            TranslationError::UnsupportedBlockType(_) => ErrorCategory::Schema,
            TranslationError::InvalidFieldValue { .. } => ErrorCategory::Schema,
            TranslationError::InvalidBlockValue { .. } => ErrorCategory::Schema,
            TranslationError::UnknownContentType(_) => ErrorCategory::Schema,
            TranslationError::MissingFragment(_) => ErrorCategory::Integrity,
            TranslationError::InvalidTemplate(_) => ErrorCategory::Integrity,
            TranslationError::IncompleteTranslation { .. } => ErrorCategory::Workflow,
            TranslationError::TranslatorError(_) => ErrorCategory::Service,
            TranslationError::UnsupportedLanguagePair { .. } => ErrorCategory::Configuration,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::IoError(_) => ErrorCategory::Input,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Input,
    Schema,
    Integrity,
    Workflow,
    Service,
    Storage,
    Configuration,
    Serialization,
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<toml::ser::Error> for TranslationError {
    fn from(error: toml::ser::Error) -> Self {
        TranslationError::SerializationError(format!("TOML序列化错误: {}", error))
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(error: config::ConfigError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

//! 翻译模块
//!
//! 从结构化内容中提取可翻译段，跟踪各语言的翻译进度，并用译文重建内容：
//! - **strings**: 干净字符串及属性旁路表
//! - **segments**: 按路径寻址的段值模型
//! - **schema** / **content**: 内容模型定义和内容对象
//! - **pipeline**: 富文本提取/还原、内容树遍历/回填
//! - **core**: 完整性跟踪和机器翻译接入
//! - **storage**: 存储协作方接口和内存实现
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust
//! use localize_segments::translation::{extract_html_segments, restore_html_segments};
//!
//! let html = "<p>Hello <b>world</b></p>";
//! let segments = extract_html_segments(html);
//! assert_eq!(segments.fragments, vec!["Hello <b>world</b>"]);
//!
//! let restored = restore_html_segments(&segments.template, &["Bonjour <b>le monde</b>"]).unwrap();
//! assert_eq!(restored, "<p>Bonjour <b>le monde</b></p>");
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块
pub mod config;

/// 完整性跟踪和机器翻译
pub mod core;

/// 内容对象
pub mod content;

/// 错误处理模块
pub mod error;

/// 段处理管道模块
pub mod pipeline;

/// 内容模型定义和注册表
pub mod schema;

/// 段值模型
pub mod segments;

/// 存储协作方
pub mod storage;

/// 干净字符串编解码
pub mod strings;

// ============================================================================
// 核心API导出
// ============================================================================

pub use self::config::{constants, ConfigManager, LocalizeConfig};
pub use self::content::{ContentObject, FieldValue, ObjectRef};
pub use self::core::{
    machine_translate, CascadeOutcome, ChildOutcome, Completeness, CompletenessTracker,
    DummyTranslator, MachineTranslationReport, SourceRevision, TrackerOptions, Translator,
};
pub use self::error::{ErrorCategory, StructuralViolation, TranslationError, TranslationResult};
pub use self::pipeline::{
    extract_block_segments, extract_html_segments, extract_segments, restore_html_segments,
    HtmlSegments, SegmentExtractor, SegmentIngestor, WalkOptions,
};
pub use self::schema::{
    BlockDef, FieldDef, FieldKind, ModelDef, NamedBlock, Registry, StreamBlockDef, StructBlockDef,
};
pub use self::segments::{SegmentKind, SegmentLocation, SegmentPath, SegmentValue};
pub use self::storage::{MemoryStore, StoreStats, TranslationStore};
pub use self::strings::{AttrsTable, StringValue};

// ============================================================================
// 模块信息
// ============================================================================

/// 模块版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MODULE_NAME: &str = "translation";

/// 模块初始化
pub fn init() {
    tracing::info!("{} 模块 v{} 已加载", MODULE_NAME, VERSION);
}

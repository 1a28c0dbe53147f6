//! # Localize Segments
//!
//! 结构化内容的本地化层：把富文本拆成模板和干净字符串，按路径提取内容树中的
//! 可翻译段，跟踪各语言的翻译完整性，并用存储的译文重建目标语言内容。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML 片段解析与序列化
//! - `translation` - 段提取、还原、回填和完整性跟踪

pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use translation::{
    extract_html_segments, extract_segments, restore_html_segments, ContentObject,
    CompletenessTracker, MemoryStore, Registry, SegmentValue, StringValue, TranslationError,
    TranslationResult,
};

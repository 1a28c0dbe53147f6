//! 段处理管道模块
//!
//! 富文本的提取与还原，以及内容树的遍历与回填

pub mod extractor;
pub mod ingest;
pub mod restorer;
pub mod walker;

// 重新导出主要类型
pub use extractor::{extract_html_segments, HtmlSegments};
pub use ingest::{group_segments, SegmentIngestor};
pub use restorer::restore_html_segments;
pub use walker::{
    extract_block_segments, extract_segments, rich_text_segments, SegmentExtractor, WalkOptions,
};

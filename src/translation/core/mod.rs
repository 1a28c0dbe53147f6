//! 翻译流程核心模块
//!
//! 段提取和回填之上的两个协作部分：
//!
//! - **完整性跟踪** (`tracker.rs`): 统计 (修订, 语言) 的翻译进度，完整时物化译本并级联到子对象
//! - **机器翻译** (`translator.rs`): 可插拔的 `Translator` 接口，以及校验后写入存储的批量翻译
//!
//! ## 模块依赖关系
//!
//! ```text
//! CompletenessTracker (tracker.rs)
//!     ├── SegmentExtractor (pipeline/walker.rs)
//!     ├── SegmentIngestor (pipeline/ingest.rs)
//!     └── TranslationStore (storage/mod.rs)
//! machine_translate (translator.rs)
//!     ├── Translator
//!     └── TranslationStore (storage/mod.rs)
//! ```

pub mod tracker;
pub mod translator;

pub use tracker::{
    CascadeOutcome, ChildOutcome, Completeness, CompletenessTracker, SourceRevision,
    TrackerOptions,
};
pub use translator::{
    machine_translate, DummyTranslator, MachineTranslationReport, RejectedTranslation, Translator,
};

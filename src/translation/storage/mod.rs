//! 存储模块
//!
//! 存储协作方的接口和一个并发安全的内存实现。

pub mod memory;

pub use memory::{MemoryStore, StoreStats};

use crate::translation::content::ContentObject;
use crate::translation::core::tracker::SourceRevision;
use crate::translation::error::TranslationResult;
use crate::translation::strings::StringValue;

/// 存储协作方
///
/// 字符串译文按源字符串的内容哈希寻址，相同的字符串在不同对象、
/// 不同语言间共享一份译文。"检查并创建"必须是原子的。
pub trait TranslationStore: Send + Sync {
    /// 查找字符串在目标语言下的译文
    fn translated_string(&self, source: &StringValue, locale: &str) -> Option<StringValue>;

    /// 保存字符串译文
    fn store_string_translation(
        &self,
        source: &StringValue,
        locale: &str,
        translation: StringValue,
    ) -> TranslationResult<()>;

    /// 按翻译键和语言获取对象
    fn get_object(&self, translation_key: &str, locale: &str) -> Option<ContentObject>;

    /// 目标语言下是否已有该对象
    fn has_translation(&self, translation_key: &str, locale: &str) -> bool {
        self.get_object(translation_key, locale).is_some()
    }

    /// 原子地获取或创建译本，返回 (对象, 是否新建)
    fn get_or_create_translation(
        &self,
        source: &ContentObject,
        locale: &str,
    ) -> TranslationResult<(ContentObject, bool)>;

    /// 原子地插入译本，已存在时不写入并返回 `false`
    fn create_translation(&self, object: ContentObject) -> TranslationResult<bool>;

    /// 保存（覆盖）对象
    fn save_object(&self, object: ContentObject) -> TranslationResult<()>;

    /// 已提交到目标语言、父对象为 `parent_key` 的源修订
    fn submitted_revisions(&self, parent_key: &str, locale: &str) -> Vec<SourceRevision>;
}

//! 内存存储
//!
//! 基于 `DashMap` 的存储实现，`entry` 持有分片锁，插入与存在性检查是原子的。

use std::sync::{Arc, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::TranslationStore;
use crate::translation::content::ContentObject;
use crate::translation::core::tracker::SourceRevision;
use crate::translation::error::TranslationResult;
use crate::translation::strings::StringValue;

/// (翻译键或内容哈希, 语言)
type LocaleKey = (String, String);

/// 存储统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub string_writes: u64,
    pub object_writes: u64,
    pub string_lookups: u64,
    pub string_hits: u64,
}

impl StoreStats {
    /// 写入总次数
    pub fn total_writes(&self) -> u64 {
        self.string_writes + self.object_writes
    }

    /// 字符串译文命中率
    pub fn hit_rate(&self) -> f64 {
        if self.string_lookups == 0 {
            0.0
        } else {
            self.string_hits as f64 / self.string_lookups as f64
        }
    }
}

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    strings: DashMap<LocaleKey, StringValue>,
    objects: DashMap<LocaleKey, ContentObject>,
    revisions: DashMap<String, Vec<SourceRevision>>,
    stats: Arc<RwLock<StoreStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接放入对象，不计入统计（用于准备源对象或已存在的译本）
    pub fn insert_object(&self, object: ContentObject) {
        self.objects.insert(
            (object.translation_key.clone(), object.locale.clone()),
            object,
        );
    }

    /// 登记一条字符串译文，不计入统计
    pub fn add_translation(&self, source: &StringValue, locale: &str, translation: StringValue) {
        self.strings
            .insert((source.content_hash(), locale.to_string()), translation);
    }

    /// 把源修订提交到目标语言
    pub fn submit_revision(&self, revision: SourceRevision, locale: &str) {
        tracing::debug!(
            "提交修订 {} ({}) 到 {}",
            revision.id,
            revision.object.translation_key,
            locale
        );
        self.revisions
            .entry(locale.to_string())
            .or_default()
            .push(revision);
    }

    /// 获取统计信息
    pub fn stats(&self) -> StoreStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// 对象数量
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn record<F: FnOnce(&mut StoreStats)>(&self, update: F) {
        match self.stats.write() {
            Ok(mut stats) => update(&mut stats),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
    }
}

impl TranslationStore for MemoryStore {
    fn translated_string(&self, source: &StringValue, locale: &str) -> Option<StringValue> {
        let found = self
            .strings
            .get(&(source.content_hash(), locale.to_string()))
            .map(|entry| entry.value().clone());

        self.record(|stats| {
            stats.string_lookups += 1;
            if found.is_some() {
                stats.string_hits += 1;
            }
        });

        found
    }

    fn store_string_translation(
        &self,
        source: &StringValue,
        locale: &str,
        translation: StringValue,
    ) -> TranslationResult<()> {
        self.strings
            .insert((source.content_hash(), locale.to_string()), translation);
        self.record(|stats| stats.string_writes += 1);
        Ok(())
    }

    fn get_object(&self, translation_key: &str, locale: &str) -> Option<ContentObject> {
        self.objects
            .get(&(translation_key.to_string(), locale.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn get_or_create_translation(
        &self,
        source: &ContentObject,
        locale: &str,
    ) -> TranslationResult<(ContentObject, bool)> {
        let key = (source.translation_key.clone(), locale.to_string());

        let result = match self.objects.entry(key) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let copy = source.copy_for_translation(locale);
                entry.insert(copy.clone());
                (copy, true)
            }
        };

        if result.1 {
            self.record(|stats| stats.object_writes += 1);
        }

        Ok(result)
    }

    fn create_translation(&self, object: ContentObject) -> TranslationResult<bool> {
        let key = (object.translation_key.clone(), object.locale.clone());

        let created = match self.objects.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(object);
                true
            }
        };

        if created {
            self.record(|stats| stats.object_writes += 1);
        }

        Ok(created)
    }

    fn save_object(&self, object: ContentObject) -> TranslationResult<()> {
        self.insert_object(object);
        self.record(|stats| stats.object_writes += 1);
        Ok(())
    }

    fn submitted_revisions(&self, parent_key: &str, locale: &str) -> Vec<SourceRevision> {
        self.revisions
            .get(locale)
            .map(|revisions| {
                revisions
                    .iter()
                    .filter(|revision| revision.object.parent.as_deref() == Some(parent_key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

//! 翻译完整性跟踪
//!
//! 一个 (源修订, 目标语言) 组合要么是 `Incomplete`（已翻译数 < 总数），要么是
//! `Complete`。从不完整变为完整时触发一次物化：
//!
//! 1. 如果目标语言还没有译本，复制源对象到目标语言
//! 2. 把当前已知的全部译文回填进副本
//! 3. 递归检查已提交到该语言、以本对象为父对象的子修订
//!    （译者的工作顺序不固定，子对象可能先于父对象完成）
//!
//! 级联是幂等的：任何写入之前都先检查译本是否已经存在，
//! 对已物化的组合再次检查不会产生写入。
//! 父对象还没有译本时返回 `Deferred`，这不是错误，等父对象完成时会再次级联到这里。

use serde::{Deserialize, Serialize};

use crate::translation::config::LocalizeConfig;
use crate::translation::content::ContentObject;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::ingest::SegmentIngestor;
use crate::translation::pipeline::walker::{SegmentExtractor, WalkOptions};
use crate::translation::schema::Registry;
use crate::translation::segments::SegmentValue;
use crate::translation::storage::TranslationStore;

/// 一次提交翻译的源修订：对象快照和当时提取出的段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRevision {
    /// 对象快照的内容哈希
    pub id: String,
    pub object: ContentObject,
    pub segments: Vec<SegmentValue>,
}

impl SourceRevision {
    /// 提取对象的段并记录快照
    pub fn capture(
        registry: &Registry,
        object: &ContentObject,
        options: WalkOptions,
    ) -> TranslationResult<Self> {
        let segments = SegmentExtractor::with_options(registry, options).extract(object)?;
        let snapshot = serde_json::to_vec(object)?;

        Ok(Self {
            id: blake3::hash(&snapshot).to_hex()[..16].to_string(),
            object: object.clone(),
            segments,
        })
    }

    /// 需要翻译的字符串段
    pub fn string_segments(&self) -> impl Iterator<Item = &SegmentValue> {
        self.segments
            .iter()
            .filter(|segment| segment.string_value().is_some())
    }
}

/// 完整性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Completeness {
    Incomplete { total: usize, translated: usize },
    Complete { total: usize },
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete { .. })
    }

    pub fn total(&self) -> usize {
        match self {
            Completeness::Incomplete { total, .. } | Completeness::Complete { total } => *total,
        }
    }

    pub fn translated(&self) -> usize {
        match self {
            Completeness::Incomplete { translated, .. } => *translated,
            Completeness::Complete { total } => *total,
        }
    }
}

/// 一次完整性检查的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CascadeOutcome {
    /// 还有字符串没有译文
    Incomplete { total: usize, translated: usize },
    /// 父对象还没有译本，推迟物化
    Deferred { parent_key: String },
    /// 译本已经存在，什么也不做
    AlreadyTranslated,
    /// 创建了译本，并对子修订做了级联检查
    Materialized { children: Vec<ChildOutcome> },
}

/// 子修订的级联结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOutcome {
    pub translation_key: String,
    pub outcome: CascadeOutcome,
}

/// 跟踪器选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOptions {
    pub max_cascade_depth: usize,
    /// 同步译本时未翻译的字符串回退到源文本
    pub fallback_to_source: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            max_cascade_depth: crate::translation::config::constants::DEFAULT_MAX_CASCADE_DEPTH,
            fallback_to_source: false,
        }
    }
}

impl From<&LocalizeConfig> for TrackerOptions {
    fn from(config: &LocalizeConfig) -> Self {
        Self {
            max_cascade_depth: config.max_cascade_depth,
            fallback_to_source: config.fallback_to_source,
        }
    }
}

/// 完整性跟踪器
pub struct CompletenessTracker<'a, S: TranslationStore + ?Sized> {
    registry: &'a Registry,
    store: &'a S,
    options: TrackerOptions,
}

impl<'a, S: TranslationStore + ?Sized> CompletenessTracker<'a, S> {
    pub fn new(registry: &'a Registry, store: &'a S) -> Self {
        Self::with_options(registry, store, TrackerOptions::default())
    }

    pub fn with_options(registry: &'a Registry, store: &'a S, options: TrackerOptions) -> Self {
        Self {
            registry,
            store,
            options,
        }
    }

    /// 统计修订在目标语言下的翻译进度
    pub fn completeness(&self, revision: &SourceRevision, locale: &str) -> Completeness {
        let mut total = 0;
        let mut translated = 0;

        for value in revision.string_segments().filter_map(SegmentValue::string_value) {
            total += 1;
            if self.store.translated_string(value, locale).is_some() {
                translated += 1;
            }
        }

        if translated == total {
            Completeness::Complete { total }
        } else {
            Completeness::Incomplete { total, translated }
        }
    }

    /// 检查修订是否已完整，完整时物化译本并级联到子修订
    pub fn check(&self, revision: &SourceRevision, locale: &str) -> TranslationResult<CascadeOutcome> {
        self.check_at_depth(revision, locale, 0)
    }

    fn check_at_depth(
        &self,
        revision: &SourceRevision,
        locale: &str,
        depth: usize,
    ) -> TranslationResult<CascadeOutcome> {
        let key = &revision.object.translation_key;

        if self.store.has_translation(key, locale) {
            tracing::debug!("{} 已有 {} 译本，跳过", key, locale);
            return Ok(CascadeOutcome::AlreadyTranslated);
        }

        if let Completeness::Incomplete { total, translated } = self.completeness(revision, locale) {
            tracing::debug!("{} 的 {} 翻译进度: {}/{}", key, locale, translated, total);
            return Ok(CascadeOutcome::Incomplete { total, translated });
        }

        if let Some(parent_key) = &revision.object.parent {
            if !self.store.has_translation(parent_key, locale) {
                tracing::info!("{} 的父对象 {} 还没有 {} 译本，推迟物化", key, parent_key, locale);
                return Ok(CascadeOutcome::Deferred {
                    parent_key: parent_key.clone(),
                });
            }
        }

        let segments = translated_segments(self.store, revision, locale, false)?;
        let mut target = revision.object.copy_for_translation(locale);
        SegmentIngestor::new(self.registry, self.store).ingest(
            &revision.object,
            &mut target,
            &segments,
        )?;

        if !self.store.create_translation(target)? {
            tracing::debug!("{} 的 {} 译本已由其他调用创建", key, locale);
            return Ok(CascadeOutcome::AlreadyTranslated);
        }

        tracing::info!("已物化 {} 的 {} 译本", key, locale);

        let children = self.cascade(revision, locale, depth)?;
        Ok(CascadeOutcome::Materialized { children })
    }

    fn cascade(
        &self,
        revision: &SourceRevision,
        locale: &str,
        depth: usize,
    ) -> TranslationResult<Vec<ChildOutcome>> {
        let key = &revision.object.translation_key;

        if depth + 1 > self.options.max_cascade_depth {
            tracing::warn!("{} 的级联已达到深度上限 {}，停止", key, self.options.max_cascade_depth);
            return Ok(Vec::new());
        }

        let mut children = Vec::new();
        for child in self.store.submitted_revisions(key, locale) {
            let outcome = self.check_at_depth(&child, locale, depth + 1)?;
            children.push(ChildOutcome {
                translation_key: child.object.translation_key.clone(),
                outcome,
            });
        }

        Ok(children)
    }

    /// 用当前已知的译文创建或更新译本
    ///
    /// 未翻译的字符串在选项 `fallback_to_source` 打开或段自身允许回退时
    /// 使用源文本，否则返回 `IncompleteTranslation`。
    pub fn sync_translation(
        &self,
        revision: &SourceRevision,
        locale: &str,
    ) -> TranslationResult<ContentObject> {
        let segments =
            translated_segments(self.store, revision, locale, self.options.fallback_to_source)?;

        let (mut target, created) = self
            .store
            .get_or_create_translation(&revision.object, locale)?;
        SegmentIngestor::new(self.registry, self.store).ingest(
            &revision.object,
            &mut target,
            &segments,
        )?;
        self.store.save_object(target.clone())?;

        tracing::info!(
            "已{} {} 的 {} 译本",
            if created { "创建" } else { "更新" },
            revision.object.translation_key,
            locale
        );

        Ok(target)
    }
}

/// 把修订中的字符串段换成目标语言译文
fn translated_segments<S: TranslationStore + ?Sized>(
    store: &S,
    revision: &SourceRevision,
    locale: &str,
    fallback: bool,
) -> TranslationResult<Vec<SegmentValue>> {
    let mut missing = 0;
    let mut segments = Vec::with_capacity(revision.segments.len());

    for segment in &revision.segments {
        match segment.string_value() {
            Some(value) => match store.translated_string(value, locale) {
                Some(translation) => segments.push(segment.with_string(translation)),
                None if fallback || segment.fallback => segments.push(segment.clone()),
                None => missing += 1,
            },
            None => segments.push(segment.clone()),
        }
    }

    if missing > 0 {
        return Err(TranslationError::IncompleteTranslation { missing });
    }

    Ok(segments)
}

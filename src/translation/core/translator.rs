//! 机器翻译接入
//!
//! 翻译器只会收到干净字符串。返回结果一律用 `from_translated_html` 重新校验，
//! 违反白名单的结果被拒绝并记入报告，不会写入存储。

use std::collections::{HashMap, HashSet};

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::segments::SegmentValue;
use crate::translation::storage::TranslationStore;
use crate::translation::strings::StringValue;

/// 可插拔的翻译器
pub trait Translator: Send + Sync {
    /// 翻译器名称，用于日志
    fn name(&self) -> &str;

    fn can_translate(&self, source_locale: &str, target_locale: &str) -> bool;

    fn translate(
        &self,
        source_locale: &str,
        target_locale: &str,
        strings: &[StringValue],
    ) -> TranslationResult<HashMap<StringValue, StringValue>>;
}

/// 测试用翻译器：把每个文本节点里的单词倒序
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyTranslator;

impl DummyTranslator {
    fn reverse_words(text: &str) -> String {
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];
        let words: Vec<&str> = text.split_whitespace().rev().collect();

        if words.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", leading, words.join(" "), trailing)
    }
}

impl Translator for DummyTranslator {
    fn name(&self) -> &str {
        "dummy"
    }

    fn can_translate(&self, source_locale: &str, target_locale: &str) -> bool {
        source_locale != target_locale
    }

    fn translate(
        &self,
        _source_locale: &str,
        _target_locale: &str,
        strings: &[StringValue],
    ) -> TranslationResult<HashMap<StringValue, StringValue>> {
        Ok(strings
            .iter()
            .map(|value| (value.clone(), value.map_text(Self::reverse_words)))
            .collect())
    }
}

/// 被拒绝的翻译结果
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedTranslation {
    pub source: StringValue,
    pub output: String,
    pub error: TranslationError,
}

/// 一次机器翻译的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineTranslationReport {
    /// 发给翻译器的字符串数
    pub requested: usize,
    /// 校验通过并写入存储的数量
    pub translated: usize,
    pub rejected: Vec<RejectedTranslation>,
    /// 翻译器没有返回结果的字符串
    pub missing: Vec<StringValue>,
}

impl MachineTranslationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.missing.is_empty()
    }
}

/// 对尚未翻译的字符串段做机器翻译
pub fn machine_translate<T, S>(
    translator: &T,
    store: &S,
    segments: &[SegmentValue],
    source_locale: &str,
    target_locale: &str,
) -> TranslationResult<MachineTranslationReport>
where
    T: Translator + ?Sized,
    S: TranslationStore + ?Sized,
{
    if !translator.can_translate(source_locale, target_locale) {
        return Err(TranslationError::UnsupportedLanguagePair {
            translator: translator.name().to_string(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let pending: Vec<StringValue> = segments
        .iter()
        .filter_map(SegmentValue::string_value)
        .filter(|value| store.translated_string(value, target_locale).is_none())
        .filter(|value| seen.insert((*value).clone()))
        .cloned()
        .collect();

    let mut report = MachineTranslationReport {
        requested: pending.len(),
        ..MachineTranslationReport::default()
    };

    if pending.is_empty() {
        return Ok(report);
    }

    tracing::info!(
        "使用 {} 翻译 {} 个字符串 ({} -> {})",
        translator.name(),
        pending.len(),
        source_locale,
        target_locale
    );

    let results = translator.translate(source_locale, target_locale, &pending)?;

    for source in pending {
        let Some(output) = results.get(&source) else {
            report.missing.push(source);
            continue;
        };

        match StringValue::from_translated_html(output.as_str()) {
            Ok(valid) => {
                store.store_string_translation(&source, target_locale, valid)?;
                report.translated += 1;
            }
            Err(error) => {
                tracing::warn!("拒绝翻译结果 '{}': {}", output, error);
                report.rejected.push(RejectedTranslation {
                    source,
                    output: output.to_string(),
                    error,
                });
            }
        }
    }

    Ok(report)
}

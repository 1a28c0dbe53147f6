//! 内容树遍历（提取）
//!
//! 按注册表中声明的可翻译字段递归遍历内容对象，产出扁平的、按路径寻址的段列表。
//! 遍历结束后统一编号，再丢弃空段。

use rayon::prelude::*;
use serde_json::Value;

use crate::translation::config::LocalizeConfig;
use crate::translation::content::{ContentObject, FieldValue, ObjectRef};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::extractor::{extract_html_segments, HtmlSegments};
use crate::translation::schema::{BlockDef, FieldDef, FieldKind, Registry, StreamBlockDef};
use crate::translation::segments::{finalize_segments, SegmentValue};

static NULL: Value = Value::Null;

/// 遍历选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// 外键递归深度上限，0 表示只产出引用
    pub max_related_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_related_depth: crate::translation::config::constants::DEFAULT_MAX_RELATED_DEPTH,
        }
    }
}

impl From<&LocalizeConfig> for WalkOptions {
    fn from(config: &LocalizeConfig) -> Self {
        Self {
            max_related_depth: config.max_related_depth,
        }
    }
}

/// 段提取器
pub struct SegmentExtractor<'a> {
    registry: &'a Registry,
    options: WalkOptions,
}

impl<'a> SegmentExtractor<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self::with_options(registry, WalkOptions::default())
    }

    pub fn with_options(registry: &'a Registry, options: WalkOptions) -> Self {
        Self { registry, options }
    }

    /// 提取一个对象的全部段
    pub fn extract(&self, object: &ContentObject) -> TranslationResult<Vec<SegmentValue>> {
        let segments = finalize_segments(self.walk_object(object, 0)?);

        tracing::debug!(
            "从 {} ({}) 提取了 {} 个段",
            object.translation_key,
            object.content_type,
            segments.len()
        );

        Ok(segments)
    }

    /// 并行提取多个互不相关的对象
    pub fn extract_many(
        &self,
        objects: &[ContentObject],
    ) -> Vec<TranslationResult<Vec<SegmentValue>>> {
        objects.par_iter().map(|object| self.extract(object)).collect()
    }

    /// 提取单个块的段
    pub fn extract_block(
        &self,
        def: &BlockDef,
        value: &Value,
        locale: &str,
    ) -> TranslationResult<Vec<SegmentValue>> {
        Ok(finalize_segments(self.walk_block(def, value, locale)?))
    }

    fn walk_object(
        &self,
        object: &ContentObject,
        depth: usize,
    ) -> TranslationResult<Vec<SegmentValue>> {
        let model = self.registry.get(&object.content_type)?;
        let mut segments = Vec::new();

        for field in &model.translatable_fields {
            let Some(value) = object.field(&field.name) else {
                tracing::debug!("字段 '{}' 没有值，跳过", field.name);
                continue;
            };

            let field_segments = self.walk_field(field, value, object, depth)?;
            segments.extend(field_segments.iter().map(|segment| segment.wrap(&field.name)));
        }

        Ok(segments)
    }

    fn walk_field(
        &self,
        field: &FieldDef,
        value: &FieldValue,
        object: &ContentObject,
        depth: usize,
    ) -> TranslationResult<Vec<SegmentValue>> {
        match (&field.kind, value) {
            (FieldKind::Char | FieldKind::Text, FieldValue::Text(text)) => {
                Ok(vec![SegmentValue::from_plaintext("", text)])
            }
            (FieldKind::RichText, FieldValue::Text(html)) => rich_text_segments(html),
            (FieldKind::Stream(def), FieldValue::Json(data)) => {
                self.walk_stream(def, data, &object.locale)
            }
            (FieldKind::ForeignKey { .. }, FieldValue::Object(related)) => {
                self.walk_related(related.as_deref(), depth)
            }
            (FieldKind::ChildCollection { .. }, FieldValue::Children(children)) => {
                let mut segments = Vec::new();
                for child in children {
                    let child_segments = self.walk_object(child, depth)?;
                    segments.extend(
                        child_segments
                            .iter()
                            .map(|segment| segment.wrap(&child.translation_key)),
                    );
                }
                Ok(segments)
            }
            (FieldKind::Overridable, FieldValue::Json(data)) => {
                Ok(vec![SegmentValue::overridable("", data.clone())])
            }
            (FieldKind::Overridable, FieldValue::Text(text)) => Ok(vec![SegmentValue::overridable(
                "",
                Value::String(text.clone()),
            )]),
            (kind, _) => Err(TranslationError::InvalidFieldValue {
                path: field.name.clone(),
                expected: expected_field_value(kind),
            }),
        }
    }

    /// 外键：先产出引用，深度允许时再递归进被引用的对象
    fn walk_related(
        &self,
        related: Option<&ContentObject>,
        depth: usize,
    ) -> TranslationResult<Vec<SegmentValue>> {
        let Some(related) = related else {
            return Ok(vec![SegmentValue::related("", None)]);
        };

        let mut segments = vec![SegmentValue::related("", Some(related.object_ref()))];
        if depth < self.options.max_related_depth {
            segments.extend(self.walk_object(related, depth + 1)?);
        } else {
            tracing::debug!(
                "外键 {} 已达到递归深度 {}，只保留引用",
                related.translation_key,
                depth
            );
        }

        Ok(segments)
    }

    fn walk_stream(
        &self,
        def: &StreamBlockDef,
        value: &Value,
        locale: &str,
    ) -> TranslationResult<Vec<SegmentValue>> {
        let mut segments = Vec::new();

        for item in stream_items(value)? {
            let child = def.child(item.block_type)?;
            let child_segments = self.walk_block(child, item.value, locale)?;
            segments.extend(child_segments.iter().map(|segment| segment.wrap(&item.key)));
        }

        Ok(segments)
    }

    fn walk_block(
        &self,
        def: &BlockDef,
        value: &Value,
        locale: &str,
    ) -> TranslationResult<Vec<SegmentValue>> {
        if value.is_null() {
            return Ok(Vec::new());
        }

        match def {
            BlockDef::Char | BlockDef::Text => match value {
                Value::String(text) => Ok(vec![SegmentValue::from_plaintext("", text)]),
                _ => Err(invalid_block(def, "字符串")),
            },
            BlockDef::RichText => match value {
                Value::String(html) => rich_text_segments(html),
                _ => Err(invalid_block(def, "HTML 字符串")),
            },
            BlockDef::Struct(struct_def) => {
                let Value::Object(map) = value else {
                    return Err(invalid_block(def, "对象"));
                };

                let mut segments = Vec::new();
                for child in struct_def.translatable_children() {
                    if let Some(child_value) = map.get(&child.name) {
                        let child_segments = self.walk_block(&child.def, child_value, locale)?;
                        segments.extend(child_segments.iter().map(|s| s.wrap(&child.name)));
                    }
                }
                Ok(segments)
            }
            BlockDef::List { child } => {
                let mut segments = Vec::new();
                for item in list_items(value)? {
                    let child_segments = self.walk_block(child, item.value, locale)?;
                    segments.extend(child_segments.iter().map(|s| s.wrap(&item.key)));
                }
                Ok(segments)
            }
            BlockDef::Stream(stream_def) => self.walk_stream(stream_def, value, locale),
            BlockDef::Overridable => Ok(vec![SegmentValue::overridable("", value.clone())]),
            BlockDef::Related { content_type } => match value {
                Value::String(translation_key) => Ok(vec![SegmentValue::related(
                    "",
                    Some(ObjectRef {
                        content_type: content_type.clone(),
                        translation_key: translation_key.clone(),
                        locale: locale.to_string(),
                    }),
                )]),
                _ => Err(invalid_block(def, "翻译键字符串")),
            },
            BlockDef::Static => Ok(Vec::new()),
        }
    }
}

/// 富文本：一个模板段加上每个片段一个字符串段，路径都为空
pub fn rich_text_segments(html: &str) -> TranslationResult<Vec<SegmentValue>> {
    let HtmlSegments {
        template,
        fragments,
    } = extract_html_segments(html);

    let mut segments = Vec::with_capacity(fragments.len() + 1);
    segments.push(SegmentValue::template("", &template, fragments.len()));
    for fragment in &fragments {
        segments.push(SegmentValue::from_source_html("", fragment)?);
    }

    Ok(segments)
}

/// 提取对象的段
pub fn extract_segments(
    registry: &Registry,
    object: &ContentObject,
) -> TranslationResult<Vec<SegmentValue>> {
    SegmentExtractor::new(registry).extract(object)
}

/// 提取单个块的段，块里的外键引用记为 `locale`
pub fn extract_block_segments(
    def: &BlockDef,
    value: &Value,
    locale: &str,
) -> TranslationResult<Vec<SegmentValue>> {
    let registry = Registry::new();
    SegmentExtractor::new(&registry).extract_block(def, value, locale)
}

/// 流或列表中的一项
pub(crate) struct BlockItem<'v> {
    /// 用于路径的键：块 id，缺失时为下标
    pub key: String,
    pub block_type: &'v str,
    pub value: &'v Value,
    /// 是否为 `{"type", "value", "id"}` 包装形式
    pub wrapped: bool,
}

fn item_key(item: &Value, index: usize) -> String {
    item.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| index.to_string())
}

/// 解析流数据 `[{"type", "value", "id"}]`
pub(crate) fn stream_items(value: &Value) -> TranslationResult<Vec<BlockItem<'_>>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(TranslationError::InvalidBlockValue {
                block_type: "stream".to_string(),
                expected: "块数组",
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let block_type = item.get("type").and_then(Value::as_str).ok_or_else(|| {
                TranslationError::InvalidBlockValue {
                    block_type: "stream".to_string(),
                    expected: "带 type 字段的块",
                }
            })?;

            Ok(BlockItem {
                key: item_key(item, index),
                block_type,
                value: item.get("value").unwrap_or(&NULL),
                wrapped: true,
            })
        })
        .collect()
}

/// 解析列表数据，兼容 `{"type": "item", "value", "id"}` 和裸值两种形式
pub(crate) fn list_items(value: &Value) -> TranslationResult<Vec<BlockItem<'_>>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(TranslationError::InvalidBlockValue {
                block_type: "list".to_string(),
                expected: "数组",
            })
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let is_wrapped = item.get("type").and_then(Value::as_str) == Some("item")
                && item.get("value").is_some();

            match item.get("value").filter(|_| is_wrapped) {
                Some(inner) => BlockItem {
                    key: item_key(item, index),
                    block_type: "item",
                    value: inner,
                    wrapped: true,
                },
                None => BlockItem {
                    key: index.to_string(),
                    block_type: "item",
                    value: item,
                    wrapped: false,
                },
            }
        })
        .collect())
}

pub(crate) fn invalid_block(def: &BlockDef, expected: &'static str) -> TranslationError {
    TranslationError::InvalidBlockValue {
        block_type: def.type_name().to_string(),
        expected,
    }
}

pub(crate) fn expected_field_value(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Char | FieldKind::Text | FieldKind::RichText => "文本",
        FieldKind::Stream(_) => "JSON 块数据",
        FieldKind::ForeignKey { .. } => "对象引用",
        FieldKind::ChildCollection { .. } => "子对象列表",
        FieldKind::Overridable => "JSON 或文本",
    }
}

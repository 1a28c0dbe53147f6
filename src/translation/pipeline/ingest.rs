//! 内容树回填（提取的逆过程）
//!
//! 把已翻译的段按第一个路径部分分组，按字段类型分派，重建字段值后写入目标副本。

use serde_json::Value;

use crate::translation::content::{ContentObject, FieldValue};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::restorer::restore_html_segments;
use crate::translation::pipeline::walker::{
    expected_field_value, invalid_block, list_items, stream_items,
};
use crate::translation::schema::{BlockDef, FieldDef, FieldKind, Registry, StreamBlockDef};
use crate::translation::segments::{SegmentKind, SegmentValue};
use crate::translation::storage::TranslationStore;

/// 按第一个路径部分分组，保持首次出现的顺序
pub fn group_segments(segments: &[SegmentValue]) -> Vec<(String, Vec<SegmentValue>)> {
    let mut groups: Vec<(String, Vec<SegmentValue>)> = Vec::new();

    for segment in segments {
        let (first, rest) = segment.unwrap();
        match groups.iter_mut().find(|(key, _)| *key == first) {
            Some((_, group)) => group.push(rest),
            None => groups.push((first, vec![rest])),
        }
    }

    groups
}

/// 段回填器
pub struct SegmentIngestor<'a, S: TranslationStore + ?Sized> {
    registry: &'a Registry,
    store: &'a S,
}

impl<'a, S: TranslationStore + ?Sized> SegmentIngestor<'a, S> {
    pub fn new(registry: &'a Registry, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// 把段回填到 `target`，`source` 提供未翻译部分的原始结构
    pub fn ingest(
        &self,
        source: &ContentObject,
        target: &mut ContentObject,
        segments: &[SegmentValue],
    ) -> TranslationResult<()> {
        let model = self.registry.get(&source.content_type)?;

        for (field_name, field_segments) in group_segments(segments) {
            let Some(field) = model.field(&field_name) else {
                tracing::warn!(
                    "{} 没有可翻译字段 '{}'，跳过 {} 个段",
                    source.content_type,
                    field_name,
                    field_segments.len()
                );
                continue;
            };

            let Some(source_value) = source.field(&field_name) else {
                tracing::warn!("源对象缺少字段 '{}'，跳过", field_name);
                continue;
            };

            self.ingest_field(field, source_value, target, &field_segments)?;
        }

        Ok(())
    }

    fn ingest_field(
        &self,
        field: &FieldDef,
        source_value: &FieldValue,
        target: &mut ContentObject,
        segments: &[SegmentValue],
    ) -> TranslationResult<()> {
        let name = field.name.as_str();

        match (&field.kind, source_value) {
            (FieldKind::Char | FieldKind::Text, FieldValue::Text(_)) => {
                if let Some(text) = root_string(segments).and_then(SegmentValue::render_text) {
                    target.set_field(name, FieldValue::Text(text));
                }
            }
            (FieldKind::RichText, FieldValue::Text(_)) => {
                target.set_field(name, FieldValue::Text(restore_rich_text(segments)?));
            }
            (FieldKind::Stream(def), FieldValue::Json(data)) => {
                let value = self.ingest_stream(def, data, segments)?;
                target.set_field(name, FieldValue::Json(value));
            }
            (FieldKind::ForeignKey { .. }, FieldValue::Object(Some(related))) => {
                let translated = self.ingest_related(related, &target.locale, segments)?;
                target.set_field(name, FieldValue::Object(Some(Box::new(translated))));
            }
            (FieldKind::ForeignKey { .. }, FieldValue::Object(None)) => {}
            (FieldKind::ChildCollection { .. }, FieldValue::Children(source_children)) => {
                self.ingest_children(name, source_children, target, segments)?;
            }
            (FieldKind::Overridable, FieldValue::Json(_) | FieldValue::Text(_)) => {
                if let Some(data) = root_overridable(segments) {
                    let value = match (source_value, data) {
                        (FieldValue::Text(_), Value::String(text)) => FieldValue::Text(text),
                        (_, data) => FieldValue::Json(data),
                    };
                    target.set_field(name, value);
                }
            }
            (kind, _) => {
                return Err(TranslationError::InvalidFieldValue {
                    path: field.name.clone(),
                    expected: expected_field_value(kind),
                })
            }
        }

        Ok(())
    }

    /// 外键：获取或创建被引用对象的译本，回填嵌套段后保存
    fn ingest_related(
        &self,
        source: &ContentObject,
        locale: &str,
        segments: &[SegmentValue],
    ) -> TranslationResult<ContentObject> {
        let (mut translated, created) = self.store.get_or_create_translation(source, locale)?;
        if created {
            tracing::info!("为关联对象 {} 创建了 {} 译本", source.translation_key, locale);
        }

        let nested: Vec<SegmentValue> = segments
            .iter()
            .filter(|segment| !segment.path.is_root())
            .cloned()
            .collect();

        if !nested.is_empty() {
            self.ingest(source, &mut translated, &nested)?;
            self.store.save_object(translated.clone())?;
        }

        Ok(translated)
    }

    /// 子对象集合：只更新目标上已经存在的子对象
    fn ingest_children(
        &self,
        name: &str,
        source_children: &[ContentObject],
        target: &mut ContentObject,
        segments: &[SegmentValue],
    ) -> TranslationResult<()> {
        let Some(FieldValue::Children(target_children)) = target.fields.get_mut(name) else {
            tracing::warn!("目标对象没有子对象集合 '{}'，跳过", name);
            return Ok(());
        };

        for (child_key, child_segments) in group_segments(segments) {
            let Some(source_child) = source_children
                .iter()
                .find(|child| child.translation_key == child_key)
            else {
                tracing::warn!("源对象中不存在子对象 '{}'，跳过", child_key);
                continue;
            };

            let Some(target_child) = target_children
                .iter_mut()
                .find(|child| child.translation_key == child_key)
            else {
                tracing::warn!("目标对象中不存在子对象 '{}'，回填不会新建子对象", child_key);
                continue;
            };

            self.ingest(source_child, target_child, &child_segments)?;
        }

        Ok(())
    }

    fn ingest_stream(
        &self,
        def: &StreamBlockDef,
        source: &Value,
        segments: &[SegmentValue],
    ) -> TranslationResult<Value> {
        let Value::Array(items) = source else {
            return Ok(source.clone());
        };

        let groups = group_segments(segments);
        let mut output = Vec::with_capacity(items.len());

        for (item, parsed) in items.iter().zip(stream_items(source)?) {
            match groups.iter().find(|(key, _)| *key == parsed.key) {
                Some((_, item_segments)) => {
                    let child = def.child(parsed.block_type)?;
                    let value = self.ingest_block(child, parsed.value, item_segments)?;
                    let mut item = item.clone();
                    item["value"] = value;
                    output.push(item);
                }
                None => output.push(item.clone()),
            }
        }

        Ok(Value::Array(output))
    }

    fn ingest_list(
        &self,
        child: &BlockDef,
        source: &Value,
        segments: &[SegmentValue],
    ) -> TranslationResult<Value> {
        let Value::Array(items) = source else {
            return Ok(source.clone());
        };

        let groups = group_segments(segments);
        let mut output = Vec::with_capacity(items.len());

        for (item, parsed) in items.iter().zip(list_items(source)?) {
            match groups.iter().find(|(key, _)| *key == parsed.key) {
                Some((_, item_segments)) => {
                    let value = self.ingest_block(child, parsed.value, item_segments)?;
                    if parsed.wrapped {
                        let mut item = item.clone();
                        item["value"] = value;
                        output.push(item);
                    } else {
                        output.push(value);
                    }
                }
                None => output.push(item.clone()),
            }
        }

        Ok(Value::Array(output))
    }

    fn ingest_block(
        &self,
        def: &BlockDef,
        source: &Value,
        segments: &[SegmentValue],
    ) -> TranslationResult<Value> {
        if segments.is_empty() {
            return Ok(source.clone());
        }

        match def {
            BlockDef::Char | BlockDef::Text => Ok(root_string(segments)
                .and_then(SegmentValue::render_text)
                .map(Value::String)
                .unwrap_or_else(|| source.clone())),
            BlockDef::RichText => Ok(Value::String(restore_rich_text(segments)?)),
            BlockDef::Struct(struct_def) => {
                let Value::Object(map) = source else {
                    return Err(invalid_block(def, "对象"));
                };

                let mut map = map.clone();
                for (name, child_segments) in group_segments(segments) {
                    let Some(child_def) = struct_def.child(&name) else {
                        tracing::warn!("结构块没有子块 '{}'，跳过", name);
                        continue;
                    };

                    let child_source = map.get(&name).cloned().unwrap_or(Value::Null);
                    let value = self.ingest_block(child_def, &child_source, &child_segments)?;
                    map.insert(name, value);
                }

                Ok(Value::Object(map))
            }
            BlockDef::List { child } => self.ingest_list(child, source, segments),
            BlockDef::Stream(stream_def) => self.ingest_stream(stream_def, source, segments),
            BlockDef::Overridable => Ok(root_overridable(segments).unwrap_or_else(|| source.clone())),
            BlockDef::Related { .. } => Ok(segments
                .iter()
                .find_map(|segment| match &segment.kind {
                    SegmentKind::RelatedObject { object: Some(object) } => {
                        Some(Value::String(object.translation_key.clone()))
                    }
                    _ => None,
                })
                .unwrap_or_else(|| source.clone())),
            BlockDef::Static => Ok(source.clone()),
        }
    }
}

fn root_string(segments: &[SegmentValue]) -> Option<&SegmentValue> {
    segments
        .iter()
        .find(|segment| segment.path.is_root() && segment.string_value().is_some())
}

fn root_overridable(segments: &[SegmentValue]) -> Option<Value> {
    segments.iter().find_map(|segment| match &segment.kind {
        SegmentKind::Overridable { data } if segment.path.is_root() => Some(data.clone()),
        _ => None,
    })
}

/// 用模板段和按顺序排列的字符串段还原富文本
///
/// 字符串段数必须等于模板声明的 `string_count`。
fn restore_rich_text(segments: &[SegmentValue]) -> TranslationResult<String> {
    let (template, string_count) = segments
        .iter()
        .find_map(|segment| match &segment.kind {
            SegmentKind::Template {
                template,
                string_count,
                ..
            } if segment.path.is_root() => Some((template, *string_count)),
            _ => None,
        })
        .ok_or_else(|| TranslationError::InvalidTemplate("富文本缺少模板段".to_string()))?;

    let mut strings: Vec<&SegmentValue> = segments
        .iter()
        .filter(|segment| segment.path.is_root() && segment.string_value().is_some())
        .collect();
    strings.sort_by_key(|segment| segment.order);

    if strings.len() < string_count {
        return Err(TranslationError::MissingFragment(strings.len()));
    }
    if strings.len() > string_count {
        return Err(TranslationError::InvalidTemplate(format!(
            "模板声明 {} 个片段，实际有 {} 个字符串段",
            string_count,
            strings.len()
        )));
    }

    let fragments: Vec<String> = strings
        .iter()
        .filter_map(|segment| segment.render_html())
        .collect();

    restore_html_segments(template, &fragments)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::translation::pipeline::walker::extract_segments;
    use crate::translation::schema::{ModelDef, NamedBlock, StructBlockDef};
    use crate::translation::storage::MemoryStore;

    fn upper(segments: &[SegmentValue]) -> Vec<SegmentValue> {
        segments
            .iter()
            .map(|segment| match segment.string_value() {
                Some(value) => segment.with_string(value.map_text(str::to_uppercase)),
                None => segment.clone(),
            })
            .collect()
    }

    fn registry() -> Registry {
        let stream = StreamBlockDef::new(vec![
            NamedBlock::new("heading", BlockDef::Char),
            NamedBlock::new(
                "card",
                BlockDef::Struct(StructBlockDef::new(vec![
                    NamedBlock::new("title", BlockDef::Char),
                    NamedBlock::new("image", BlockDef::Overridable),
                ])),
            ),
            NamedBlock::new(
                "tags",
                BlockDef::List {
                    child: Box::new(BlockDef::Char),
                },
            ),
        ]);

        Registry::from_models(vec![
            ModelDef::new(
                "blog.page",
                vec![
                    FieldDef::new("title", FieldKind::Char),
                    FieldDef::new("body", FieldKind::RichText),
                    FieldDef::new("content", FieldKind::Stream(stream)),
                    FieldDef::new(
                        "faqs",
                        FieldKind::ChildCollection {
                            content_type: "blog.faq".to_string(),
                        },
                    ),
                ],
            ),
            ModelDef::new("blog.faq", vec![FieldDef::new("question", FieldKind::Text)]),
        ])
    }

    #[test]
    fn test_group_segments_keeps_order() {
        let groups = group_segments(&[
            SegmentValue::from_plaintext("b.x", "1"),
            SegmentValue::from_plaintext("a", "2"),
            SegmentValue::from_plaintext("b.y", "3"),
        ]);

        let keys: Vec<&str> = groups.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(groups[0].1[1].path.as_str(), "y");
    }

    #[test]
    fn test_ingest_text_and_rich_text() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en")
            .with_text("title", "Hello")
            .with_text("body", r#"<p>Read <a href="/x">this</a></p><p>Bye</p>"#);

        let segments = upper(&extract_segments(&registry, &source).unwrap());
        let mut target = source.copy_for_translation("fr");
        SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &segments)
            .unwrap();

        assert_eq!(target.text("title"), Some("HELLO"));
        assert_eq!(
            target.text("body"),
            Some(r#"<p>READ <a href="/x">THIS</a></p><p>BYE</p>"#)
        );
    }

    #[test]
    fn test_ingest_stream_blocks() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en").with_field(
            "content",
            FieldValue::Json(json!([
                {"type": "heading", "value": "Intro", "id": "h1"},
                {"type": "card", "value": {"title": "Card", "image": 7}, "id": "c1"},
                {"type": "tags", "value": ["red", "blue"], "id": "t1"}
            ])),
        );

        let segments = upper(&extract_segments(&registry, &source).unwrap());
        let mut target = source.copy_for_translation("fr");
        SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &segments)
            .unwrap();

        assert_eq!(
            target.field("content"),
            Some(&FieldValue::Json(json!([
                {"type": "heading", "value": "INTRO", "id": "h1"},
                {"type": "card", "value": {"title": "CARD", "image": 7}, "id": "c1"},
                {"type": "tags", "value": ["RED", "BLUE"], "id": "t1"}
            ])))
        );
    }

    #[test]
    fn test_ingest_children_updates_existing_only() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en").with_field(
            "faqs",
            FieldValue::Children(vec![
                ContentObject::new("blog.faq", "faq-1", "en").with_text("question", "Why?"),
                ContentObject::new("blog.faq", "faq-2", "en").with_text("question", "How?"),
            ]),
        );

        let segments = upper(&extract_segments(&registry, &source).unwrap());
        let mut target = ContentObject::new("blog.page", "page-1", "fr").with_field(
            "faqs",
            FieldValue::Children(vec![
                ContentObject::new("blog.faq", "faq-1", "fr").with_text("question", "Why?"),
            ]),
        );

        SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &segments)
            .unwrap();

        match target.field("faqs") {
            Some(FieldValue::Children(children)) => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].text("question"), Some("WHY?"));
            }
            other => panic!("unexpected field value: {:?}", other),
        }
    }

    #[test]
    fn test_rich_text_missing_fragment() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en")
            .with_text("body", "<p>One</p><p>Two</p>");

        let mut segments = extract_segments(&registry, &source).unwrap();
        segments.pop();

        let mut target = source.copy_for_translation("fr");
        let error = SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &segments)
            .unwrap_err();

        assert_eq!(error, TranslationError::MissingFragment(1));
    }

    #[test]
    fn test_rich_text_extra_string_is_rejected() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en").with_text("body", "<p>One</p>");

        let mut segments = extract_segments(&registry, &source).unwrap();
        segments.push(SegmentValue::from_plaintext("body", "Extra"));

        let mut target = source.copy_for_translation("fr");
        let error = SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &segments)
            .unwrap_err();

        assert!(matches!(error, TranslationError::InvalidTemplate(_)), "{:?}", error);
        assert_eq!(target.text("body"), Some("<p>One</p>"));
    }

    #[test]
    fn test_rich_text_with_unicode_space_fragment() {
        let registry = registry();
        let store = MemoryStore::new();
        let source = ContentObject::new("blog.page", "page-1", "en")
            .with_text("body", "<p>\u{2003}</p><p>Hi</p>");

        let segments = extract_segments(&registry, &source).unwrap();
        assert!(matches!(
            segments[0].kind,
            SegmentKind::Template { string_count: 2, .. }
        ));
        assert_eq!(segments.iter().filter(|s| s.string_value().is_some()).count(), 2);

        let mut target = source.copy_for_translation("fr");
        SegmentIngestor::new(&registry, &store)
            .ingest(&source, &mut target, &upper(&segments))
            .unwrap();

        assert_eq!(target.text("body"), Some("<p>\u{2003}</p><p>HI</p>"));
    }
}

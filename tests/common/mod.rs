// 集成测试公共模块
//
// 提供内容模型、测试对象和译文准备等共享功能

use localize_segments::translation::{
    BlockDef, ContentObject, FieldDef, FieldKind, FieldValue, MemoryStore, ModelDef, NamedBlock,
    Registry, SegmentValue, StreamBlockDef, StructBlockDef, TranslationStore,
};
use serde_json::json;

/// 测试用内容模型
pub struct SchemaFixtures;

impl SchemaFixtures {
    /// 页面、作者和章节三个模型
    pub fn blog_registry() -> Registry {
        let body = StreamBlockDef::new(vec![
            NamedBlock::new("heading", BlockDef::Char),
            NamedBlock::new("paragraph", BlockDef::RichText),
            NamedBlock::new(
                "quote",
                BlockDef::Struct(StructBlockDef::new(vec![
                    NamedBlock::new("text", BlockDef::Text),
                    NamedBlock::new("attribution", BlockDef::Char),
                ])),
            ),
            NamedBlock::new(
                "tags",
                BlockDef::List {
                    child: Box::new(BlockDef::Char),
                },
            ),
            NamedBlock::new("embed", BlockDef::Static),
        ]);

        Registry::from_models(vec![
            ModelDef::new(
                "blog.page",
                vec![
                    FieldDef::new("title", FieldKind::Char),
                    FieldDef::new("intro", FieldKind::RichText),
                    FieldDef::new("body", FieldKind::Stream(body)),
                    FieldDef::new(
                        "author",
                        FieldKind::ForeignKey {
                            content_type: "blog.author".to_string(),
                        },
                    ),
                    FieldDef::new(
                        "sections",
                        FieldKind::ChildCollection {
                            content_type: "blog.section".to_string(),
                        },
                    ),
                    FieldDef::new("hero_image", FieldKind::Overridable),
                ],
            ),
            ModelDef::new("blog.author", vec![FieldDef::new("bio", FieldKind::Text)]),
            ModelDef::new(
                "blog.section",
                vec![FieldDef::new("heading", FieldKind::Char)],
            ),
        ])
    }
}

/// 测试对象
pub struct ContentFixtures;

impl ContentFixtures {
    pub fn author() -> ContentObject {
        ContentObject::new("blog.author", "author-1", "en").with_text("bio", "Writes about Rust")
    }

    pub fn page() -> ContentObject {
        ContentObject::new("blog.page", "page-1", "en")
            .with_text("title", "Welcome")
            .with_text(
                "intro",
                r#"<p>Read the <a href="/docs">docs</a> first.</p><p>Then build.</p>"#,
            )
            .with_field(
                "body",
                FieldValue::Json(json!([
                    {"type": "heading", "value": "Getting started", "id": "b1"},
                    {"type": "paragraph", "value": "<p>Install <b>now</b>.</p>", "id": "b2"},
                    {"type": "quote", "value": {"text": "Ship it", "attribution": ""}, "id": "b3"},
                    {"type": "tags", "value": ["rust", "i18n"], "id": "b4"},
                    {"type": "embed", "value": {"url": "https://example.com"}, "id": "b5"}
                ])),
            )
            .with_field("author", FieldValue::Object(Some(Box::new(Self::author()))))
            .with_field(
                "sections",
                FieldValue::Children(vec![
                    ContentObject::new("blog.section", "section-1", "en")
                        .with_text("heading", "First"),
                    ContentObject::new("blog.section", "section-2", "en")
                        .with_text("heading", "Second"),
                ]),
            )
            .with_field("hero_image", FieldValue::Json(json!({"id": 42})))
    }
}

/// 把段的路径收集为字符串
pub fn paths(segments: &[SegmentValue]) -> Vec<String> {
    segments.iter().map(|s| s.path.to_string()).collect()
}

/// 用 `f` 改写每个字符串段的文本并登记为译文
pub fn translate_all<F>(store: &MemoryStore, segments: &[SegmentValue], locale: &str, f: F)
where
    F: Fn(&str) -> String,
{
    for value in segments.iter().filter_map(SegmentValue::string_value) {
        store.add_translation(value, locale, value.map_text(&f));
    }
}

/// 只为前 `count` 个字符串段写入译文
pub fn translate_first<F>(
    store: &MemoryStore,
    segments: &[SegmentValue],
    locale: &str,
    count: usize,
    f: F,
) where
    F: Fn(&str) -> String,
{
    for value in segments
        .iter()
        .filter_map(SegmentValue::string_value)
        .take(count)
    {
        store
            .store_string_translation(value, locale, value.map_text(&f))
            .unwrap();
    }
}

//! 内容树提取与回填的集成测试

use localize_segments::translation::{
    extract_block_segments, extract_segments, BlockDef, ContentObject, FieldValue, MemoryStore,
    NamedBlock, Registry, SegmentExtractor, SegmentIngestor, SegmentKind, SegmentValue,
    StructBlockDef, TranslationError, TranslationStore, WalkOptions,
};
use serde_json::json;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{paths, translate_all, ContentFixtures, SchemaFixtures};

#[test]
fn test_page_segment_paths() {
    let registry = SchemaFixtures::blog_registry();
    let segments = extract_segments(&registry, &ContentFixtures::page()).unwrap();

    assert_eq!(
        paths(&segments),
        vec![
            "title",
            "intro",
            "intro",
            "intro",
            "body.b1",
            "body.b2",
            "body.b2",
            "body.b3.text",
            "body.b4.0",
            "body.b4.1",
            "author",
            "author.bio",
            "sections.section-1.heading",
            "sections.section-2.heading",
            "hero_image",
        ]
    );

    let strings = segments.iter().filter(|s| s.string_value().is_some()).count();
    assert_eq!(strings, 11);
}

#[test]
fn test_extraction_order_is_stable() {
    let registry = SchemaFixtures::blog_registry();
    let page = ContentFixtures::page();

    let first = extract_segments(&registry, &page).unwrap();
    let second = extract_segments(&registry, &page).unwrap();

    assert_eq!(paths(&first), paths(&second));
    assert_eq!(
        first.iter().map(|s| s.order).collect::<Vec<_>>(),
        second.iter().map(|s| s.order).collect::<Vec<_>>()
    );
}

#[test]
fn test_empty_struct_field_is_filtered() {
    let def = BlockDef::Struct(StructBlockDef::new(vec![
        NamedBlock::new("field_a", BlockDef::Char),
        NamedBlock::new("field_b", BlockDef::Char),
    ]));

    let segments =
        extract_block_segments(&def, &json!({"field_a": "", "field_b": "Content"}), "en").unwrap();

    assert_eq!(segments, vec![SegmentValue::from_plaintext("field_b", "Content")]);
}

#[test]
fn test_wrap_unwrap_inverse() {
    let registry = SchemaFixtures::blog_registry();
    let segments = extract_segments(&registry, &ContentFixtures::page()).unwrap();

    for segment in &segments {
        for prefix in ["field", "b1", "section-9"] {
            let (first, rest) = segment.wrap(prefix).unwrap();
            assert_eq!(first, prefix);
            assert_eq!(&rest, segment);
        }
    }
}

#[test]
fn test_related_object_pointer_only() {
    let registry = SchemaFixtures::blog_registry();
    let extractor =
        SegmentExtractor::with_options(&registry, WalkOptions { max_related_depth: 0 });

    let segments = extractor.extract(&ContentFixtures::page()).unwrap();
    let author: Vec<&SegmentValue> = segments
        .iter()
        .filter(|s| s.path.as_str().starts_with("author"))
        .collect();

    assert_eq!(author.len(), 1);
    match &author[0].kind {
        SegmentKind::RelatedObject { object: Some(object) } => {
            assert_eq!(object.translation_key, "author-1");
            assert_eq!(object.content_type, "blog.author");
        }
        other => panic!("unexpected segment kind: {:?}", other),
    }
}

#[test]
fn test_unknown_stream_block_fails_walk() {
    let registry = SchemaFixtures::blog_registry();
    let page = ContentObject::new("blog.page", "page-2", "en").with_field(
        "body",
        FieldValue::Json(json!([{"type": "video", "value": "x", "id": "v1"}])),
    );

    let error = extract_segments(&registry, &page).unwrap_err();
    assert_eq!(error, TranslationError::UnsupportedBlockType("video".to_string()));
}

#[test]
fn test_unknown_content_type() {
    let registry = Registry::new();
    let error = extract_segments(&registry, &ContentFixtures::page()).unwrap_err();
    assert_eq!(error, TranslationError::UnknownContentType("blog.page".to_string()));
}

#[test]
fn test_extract_many_matches_sequential() {
    let registry = SchemaFixtures::blog_registry();
    let objects = vec![
        ContentFixtures::page(),
        ContentFixtures::author(),
        ContentObject::new("blog.section", "section-3", "en").with_text("heading", "Third"),
    ];

    let extractor = SegmentExtractor::new(&registry);
    let parallel = extractor.extract_many(&objects);

    assert_eq!(parallel.len(), 3);
    for (object, segments) in objects.iter().zip(parallel) {
        assert_eq!(segments.unwrap(), extractor.extract(object).unwrap());
    }
}

#[test]
fn test_ingest_rebuilds_translated_page() {
    let registry = SchemaFixtures::blog_registry();
    let store = MemoryStore::new();
    let source = ContentFixtures::page();

    let segments = extract_segments(&registry, &source).unwrap();
    let translated: Vec<SegmentValue> = segments
        .iter()
        .map(|segment| match segment.string_value() {
            Some(value) => segment.with_string(value.map_text(str::to_uppercase)),
            None => segment.clone(),
        })
        .collect();

    let mut target = source.copy_for_translation("fr");
    SegmentIngestor::new(&registry, &store)
        .ingest(&source, &mut target, &translated)
        .unwrap();

    assert_eq!(target.locale, "fr");
    assert_eq!(target.text("title"), Some("WELCOME"));
    assert_eq!(
        target.text("intro"),
        Some(r#"<p>READ THE <a href="/docs">DOCS</a> FIRST.</p><p>THEN BUILD.</p>"#)
    );

    assert_eq!(
        target.field("body"),
        Some(&FieldValue::Json(json!([
            {"type": "heading", "value": "GETTING STARTED", "id": "b1"},
            {"type": "paragraph", "value": "<p>INSTALL <b>NOW</b>.</p>", "id": "b2"},
            {"type": "quote", "value": {"text": "SHIP IT", "attribution": ""}, "id": "b3"},
            {"type": "tags", "value": ["RUST", "I18N"], "id": "b4"},
            {"type": "embed", "value": {"url": "https://example.com"}, "id": "b5"}
        ])))
    );

    match target.field("sections") {
        Some(FieldValue::Children(children)) => {
            let headings: Vec<_> = children.iter().map(|c| c.text("heading")).collect();
            assert_eq!(headings, vec![Some("FIRST"), Some("SECOND")]);
            assert!(children.iter().all(|c| c.locale == "fr"));
        }
        other => panic!("unexpected sections: {:?}", other),
    }

    assert_eq!(target.field("hero_image"), Some(&FieldValue::Json(json!({"id": 42}))));

    let author = store.get_object("author-1", "fr").unwrap();
    assert_eq!(author.text("bio"), Some("WRITES ABOUT RUST"));
    assert_eq!(
        target.field("author"),
        Some(&FieldValue::Object(Some(Box::new(author))))
    );
}

#[test]
fn test_ingest_with_stored_translations() {
    let registry = SchemaFixtures::blog_registry();
    let store = MemoryStore::new();
    let source = ContentObject::new("blog.section", "section-1", "en").with_text("heading", "First");

    let segments = extract_segments(&registry, &source).unwrap();
    translate_all(&store, &segments, "de", |text| format!("{}!", text));

    let translated: Vec<SegmentValue> = segments
        .iter()
        .map(|segment| {
            let value = segment.string_value().unwrap();
            segment.with_string(store.translated_string(value, "de").unwrap())
        })
        .collect();

    let mut target = source.copy_for_translation("de");
    SegmentIngestor::new(&registry, &store)
        .ingest(&source, &mut target, &translated)
        .unwrap();

    assert_eq!(target.text("heading"), Some("First!"));
}

#[test]
fn test_ingest_never_creates_children() {
    let registry = SchemaFixtures::blog_registry();
    let store = MemoryStore::new();
    let source = ContentFixtures::page();

    let segments = extract_segments(&registry, &source).unwrap();

    let mut target = source.copy_for_translation("fr");
    target.set_field(
        "sections",
        FieldValue::Children(vec![ContentObject::new("blog.section", "section-1", "fr")
            .with_text("heading", "Premier")]),
    );

    SegmentIngestor::new(&registry, &store)
        .ingest(&source, &mut target, &segments)
        .unwrap();

    match target.field("sections") {
        Some(FieldValue::Children(children)) => {
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].text("heading"), Some("First"));
        }
        other => panic!("unexpected sections: {:?}", other),
    }
}

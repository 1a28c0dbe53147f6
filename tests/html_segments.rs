//! 富文本提取与还原的集成测试
//!
//! 覆盖模板/片段拆分、干净字符串编解码和往返还原

use localize_segments::parsers::decode_html;
use localize_segments::translation::{
    extract_html_segments, restore_html_segments, StructuralViolation, StringValue,
    TranslationError,
};

/// 提取后用原片段还原，应得到原文
#[test]
fn test_round_trip_preserves_markup() {
    let cases = [
        "<p>Plain paragraph.</p>",
        "<h2>Heading</h2><p>Mixed <b>bold</b>, <i>italic</i> and <code>code</code>.</p>",
        r#"<p>A <a href="https://example.com" title="Example">link</a> here.</p>"#,
        "<ul><li>One</li><li>Two <strong>strong</strong></li></ul>",
        "<blockquote><p>Quoted</p></blockquote><p>  padded  </p>",
        "<table><tr><td>Cell</td><td><em>emphasis</em></td></tr></table>",
        "<table><tbody><tr><td>Body row</td></tr></tbody></table>",
        "<p>Foo<div>Bar</div></p>",
        "<div><p>Open paragraph<p>Nested <b>one</b></p></p></div>",
    ];

    for html in cases {
        let segments = extract_html_segments(html);
        let restored = restore_html_segments(&segments.template, &segments.fragments).unwrap();
        assert_eq!(restored, html, "round trip failed for {}", html);
    }
}

#[test]
fn test_restore_with_translated_fragments() {
    let segments = extract_html_segments("<h1>Title</h1><p>Some <b>bold</b> text.</p>");
    assert_eq!(segments.fragments.len(), 2);

    let restored =
        restore_html_segments(&segments.template, &["Titre", "Du texte en <b>gras</b>."]).unwrap();

    assert_eq!(restored, "<h1>Titre</h1><p>Du texte en <b>gras</b>.</p>");
}

#[test]
fn test_empty_inline_tag_yields_no_fragment() {
    let segments = extract_html_segments("<p><i></i>Foo</p>");

    assert_eq!(
        segments.template,
        r#"<p><i></i><text position="0"></text></p>"#
    );
    assert_eq!(segments.fragments, vec!["Foo"]);
}

#[test]
fn test_nested_block_is_unwrapped() {
    let segments = extract_html_segments("<p><i>Foo <p>Bar</p></i></p>");
    assert_eq!(segments.fragments, vec!["Foo", "Bar"]);
}

#[test]
fn test_missing_fragment_is_fatal() {
    let segments = extract_html_segments("<p>One</p><p>Two</p>");

    let error = restore_html_segments(&segments.template, &["Un"]).unwrap_err();
    assert_eq!(error, TranslationError::MissingFragment(1));
    assert!(!error.is_retryable());
}

#[test]
fn test_source_html_attributes_round_trip() {
    let html = r#"Visit <a class="x" href="/a">first</a> and <a href="/b">second</a>."#;

    let (value, attrs) = StringValue::from_source_html(html).unwrap();

    assert_eq!(
        value.as_str(),
        r#"Visit <a id="a1">first</a> and <a id="a2">second</a>."#
    );
    assert_eq!(attrs.len(), 2);
    assert_eq!(value.render_html(&attrs), html);
}

#[test]
fn test_whitelist_enforcement() {
    let error = StringValue::from_source_html("<p>text</p>").unwrap_err();
    assert_eq!(
        error,
        TranslationError::StructuralViolation(StructuralViolation::DisallowedTag {
            tag: "p".to_string()
        })
    );

    let error = StringValue::from_translated_html(r#"<a href="x">t</a>"#).unwrap_err();
    assert!(matches!(
        error,
        TranslationError::StructuralViolation(StructuralViolation::DisallowedAttribute { .. })
    ));
}

#[test]
fn test_plaintext_escaping_and_rendering() {
    let value = StringValue::from_plaintext("Fish & chips\n<cheap>");

    assert_eq!(value.as_str(), "Fish &amp; chips<br>&lt;cheap&gt;");
    assert_eq!(value.render_text(), "Fish & chips\n<cheap>");
}

#[test]
fn test_decode_legacy_encoding() {
    // "café" in windows-1252
    let bytes = b"<p>caf\xe9</p>";

    let html = decode_html(bytes, "windows-1252");
    let segments = extract_html_segments(&html);

    assert_eq!(segments.fragments, vec!["café"]);
}

#[test]
fn test_segments_serialize_as_json() {
    let segments = extract_html_segments("<p>Hello</p>");

    let json = serde_json::to_value(&segments).unwrap();
    assert_eq!(json["fragments"][0], "Hello");

    let parsed: localize_segments::translation::HtmlSegments =
        serde_json::from_value(json).unwrap();
    assert_eq!(parsed, segments);
}

/// 译者可见的行内标签白名单，其余标签一律按块级处理
pub const INLINE_TAGS: &[&str] = &["a", "abbr", "acronym", "b", "code", "em", "i", "strong", "br"];

/// 内容不参与提取的元素
pub const OPAQUE_TAGS: &[&str] = &["script", "style"];

/// 没有结束标签的空元素
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// 模板中占位符使用的标签名
pub const PLACEHOLDER_TAG: &str = "text";

/// 占位符上记录片段序号的属性
pub const POSITION_ATTR: &str = "position";

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 检查标签是否为行内标签
pub fn is_inline_tag(name: &str) -> bool {
    INLINE_TAGS.contains(&name)
}

/// 检查标签内容是否应原样保留
pub fn is_opaque_tag(name: &str) -> bool {
    OPAQUE_TAGS.contains(&name)
}

/// 检查标签是否为空元素
pub fn is_void_tag(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

/// 检查字符串是否只包含空白
pub fn is_whitespace(s: &str) -> bool {
    s.trim_matches(WHITESPACES).is_empty()
}

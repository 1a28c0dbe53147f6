//! 段值模型
//!
//! 一次提取过程中产生的可翻译单元。段值按路径寻址，`wrap`/`unwrap`
//! 用于在递归遍历时组合和拆分路径；所有变换都返回新值，不会原地修改。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::translation::content::ObjectRef;
use crate::translation::error::TranslationResult;
use crate::translation::strings::{AttrsTable, StringValue};

/// 以 `.` 分隔的段路径
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentPath(String);

impl SegmentPath {
    pub fn new(path: &str) -> Self {
        Self(path.to_string())
    }

    /// 空路径，指向当前对象本身
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 在路径前面加一个组成部分
    pub fn wrap(&self, prefix: &str) -> Self {
        if self.0.is_empty() {
            Self(prefix.to_string())
        } else {
            Self(format!("{}.{}", prefix, self.0))
        }
    }

    /// 弹出第一个组成部分，返回 (第一个部分, 剩余路径)
    pub fn unwrap(&self) -> (String, Self) {
        match self.0.split_once('.') {
            Some((first, rest)) => (first.to_string(), Self(rest.to_string())),
            None => (self.0.clone(), Self::root()),
        }
    }
}

impl fmt::Display for SegmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 模板格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    Html,
}

/// 段的具体内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    /// 可翻译字符串
    String {
        value: StringValue,
        #[serde(default)]
        attrs: AttrsTable,
    },
    /// 富文本骨架
    Template {
        format: TemplateFormat,
        template: String,
        string_count: usize,
    },
    /// 指向另一个可翻译对象
    RelatedObject { object: Option<ObjectRef> },
    /// 原样同步、可按语言覆盖的值
    Overridable { data: serde_json::Value },
}

/// 段值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentValue {
    pub path: SegmentPath,
    #[serde(default)]
    pub order: usize,
    /// 未翻译时是否回退到源内容
    #[serde(default)]
    pub fallback: bool,
    #[serde(flatten)]
    pub kind: SegmentKind,
}

impl SegmentValue {
    pub fn new(path: &str, kind: SegmentKind) -> Self {
        let fallback = matches!(kind, SegmentKind::Overridable { .. });
        Self {
            path: SegmentPath::new(path),
            order: 0,
            fallback,
            kind,
        }
    }

    pub fn string(path: &str, value: StringValue, attrs: AttrsTable) -> Self {
        Self::new(path, SegmentKind::String { value, attrs })
    }

    pub fn from_plaintext(path: &str, text: &str) -> Self {
        Self::string(path, StringValue::from_plaintext(text), AttrsTable::new())
    }

    pub fn from_source_html(path: &str, html: &str) -> TranslationResult<Self> {
        let (value, attrs) = StringValue::from_source_html(html)?;
        Ok(Self::string(path, value, attrs))
    }

    pub fn template(path: &str, template: &str, string_count: usize) -> Self {
        Self::new(
            path,
            SegmentKind::Template {
                format: TemplateFormat::Html,
                template: template.to_string(),
                string_count,
            },
        )
    }

    pub fn related(path: &str, object: Option<ObjectRef>) -> Self {
        Self::new(path, SegmentKind::RelatedObject { object })
    }

    pub fn overridable(path: &str, data: serde_json::Value) -> Self {
        Self::new(path, SegmentKind::Overridable { data })
    }

    pub fn wrap(&self, prefix: &str) -> Self {
        Self {
            path: self.path.wrap(prefix),
            ..self.clone()
        }
    }

    pub fn unwrap(&self) -> (String, Self) {
        let (first, rest) = self.path.unwrap();
        (
            first,
            Self {
                path: rest,
                ..self.clone()
            },
        )
    }

    pub fn with_order(&self, order: usize) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }

    pub fn with_fallback(&self, fallback: bool) -> Self {
        Self {
            fallback,
            ..self.clone()
        }
    }

    /// 替换字符串内容，保留路径、顺序和属性表
    pub fn with_string(&self, value: StringValue) -> Self {
        match &self.kind {
            SegmentKind::String { attrs, .. } => Self {
                kind: SegmentKind::String {
                    value,
                    attrs: attrs.clone(),
                },
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// 没有可翻译内容的段在进入存储前会被丢弃
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            SegmentKind::String { value, .. } => value.is_empty(),
            SegmentKind::Template { string_count, .. } => *string_count == 0,
            SegmentKind::RelatedObject { object } => object.is_none(),
            SegmentKind::Overridable { data } => data.is_null(),
        }
    }

    pub fn string_value(&self) -> Option<&StringValue> {
        match &self.kind {
            SegmentKind::String { value, .. } => Some(value),
            _ => None,
        }
    }

    /// 纯文本形式
    pub fn render_text(&self) -> Option<String> {
        self.string_value().map(StringValue::render_text)
    }

    /// 还原属性后的 HTML
    pub fn render_html(&self) -> Option<String> {
        match &self.kind {
            SegmentKind::String { value, attrs } => Some(value.render_html(attrs)),
            _ => None,
        }
    }

    pub fn location(&self) -> SegmentLocation {
        SegmentLocation::from(self)
    }
}

/// 结构相等：只比较路径和内容
impl PartialEq for SegmentValue {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.kind == other.kind
    }
}

/// 按顺序编号并丢弃空段
pub fn finalize_segments(segments: Vec<SegmentValue>) -> Vec<SegmentValue> {
    segments
        .iter()
        .enumerate()
        .map(|(order, segment)| segment.with_order(order))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// 段的种类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    String,
    Template,
    RelatedObject,
    Overridable,
}

/// 段位置：存储协作方保存的是位置和内容哈希，而不是段值本身
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentLocation {
    pub path: SegmentPath,
    pub order: usize,
    pub kind: LocationKind,
    pub content_hash: Option<String>,
}

impl From<&SegmentValue> for SegmentLocation {
    fn from(segment: &SegmentValue) -> Self {
        let (kind, content_hash) = match &segment.kind {
            SegmentKind::String { value, .. } => (LocationKind::String, Some(value.content_hash())),
            SegmentKind::Template { template, .. } => (
                LocationKind::Template,
                Some(blake3::hash(template.as_bytes()).to_hex().to_string()),
            ),
            SegmentKind::RelatedObject { .. } => (LocationKind::RelatedObject, None),
            SegmentKind::Overridable { .. } => (LocationKind::Overridable, None),
        };

        Self {
            path: segment.path.clone(),
            order: segment.order,
            kind,
            content_hash,
        }
    }
}
